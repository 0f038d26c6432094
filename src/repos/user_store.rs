//! User/role store interface used by the auth handlers.
//!
//! This is intentionally small and injected as a trait object:
//! - Token issuance only needs `find_by_id`.
//! - The SSO exchange additionally needs `update`.
//! - Everything else about user CRUD lives outside this service.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::repos::error::StoreError;

/// A named capability bucket. Authorization checks look roles up by `name`;
/// the `id` travels in token claims for callers that need it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    pub id: String,
    pub name: String,
}

/// A stored principal, roles already resolved.
///
/// `password` is a bcrypt hash and must never be serialized outward; the
/// userinfo DTO projects this record without it.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub locale: Option<String>,
    pub timezone: Option<String>,
    pub verified_email: bool,
    pub auth_type: Option<String>,
    pub idp_metadata_url: Option<String>,
    pub roles: Vec<RoleRef>,
}

/// Partial update applied after a successful SSO exchange.
///
/// `None` fields are left untouched; the fixed fields are always written.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub locale: Option<String>,
    pub phone: Option<String>,
    pub timezone: Option<String>,
    pub auth_type: Option<String>,
    pub verified_email: Option<bool>,
    pub idp_metadata_url: Option<String>,
}

/// Store seam. Implementations must be safe to share across requests; the
/// store owns whatever per-record atomicity it provides.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError>;

    // Update-only: returns the refreshed record, or None when no record
    // matched `id`. Callers decide whether a missing record is an error.
    async fn update(&self, id: &str, update: UserUpdate) -> Result<Option<UserRecord>, StoreError>;
}
