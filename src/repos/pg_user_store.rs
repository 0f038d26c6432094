use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::repos::error::StoreError;
use crate::repos::user_store::{RoleRef, UserRecord, UserStore, UserUpdate};

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: String,
    password: Option<String>,
    phone: Option<String>,
    locale: Option<String>,
    timezone: Option<String>,
    verified_email: bool,
    auth_type: Option<String>,
    idp_metadata_url: Option<String>,
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: String,
    name: String,
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn roles_for(&self, user_id: &str) -> Result<Vec<RoleRef>, StoreError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT r.id, r.name
            FROM roles r
            INNER JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| RoleRef {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    async fn record_for(&self, row: UserRow) -> Result<UserRecord, StoreError> {
        let roles = self.roles_for(&row.id).await?;
        Ok(UserRecord {
            id: row.id,
            username: row.username,
            email: row.email,
            password: row.password,
            phone: row.phone,
            locale: row.locale,
            timezone: row.timezone,
            verified_email: row.verified_email,
            auth_type: row.auth_type,
            idp_metadata_url: row.idp_metadata_url,
            roles,
        })
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password, phone, locale, timezone,
                   verified_email, auth_type, idp_metadata_url
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.record_for(row).await?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: &str, update: UserUpdate) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                locale = COALESCE($4, locale),
                phone = COALESCE($5, phone),
                timezone = COALESCE($6, timezone),
                auth_type = COALESCE($7, auth_type),
                verified_email = COALESCE($8, verified_email),
                idp_metadata_url = COALESCE($9, idp_metadata_url)
            WHERE id = $1
            RETURNING id, username, email, password, phone, locale, timezone,
                      verified_email, auth_type, idp_metadata_url
            "#,
        )
        .bind(id)
        .bind(update.username)
        .bind(update.email)
        .bind(update.locale)
        .bind(update.phone)
        .bind(update.timezone)
        .bind(update.auth_type)
        .bind(update.verified_email)
        .bind(update.idp_metadata_url)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.record_for(row).await?)),
            None => Ok(None),
        }
    }
}
