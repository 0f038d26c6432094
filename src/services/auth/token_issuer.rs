use chrono::Utc;

use crate::repos::user_store::UserRecord;
use crate::services::auth::jwt::{AccessTokenClaims, TokenCodec, TokenError};

/// Service-level return type to keep handlers thin.
#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: u64,
}

/// Assembles the claim set for a stored principal and signs it.
///
/// The clock is read here (and only here): `iat`/`nbf` are now, `exp` is now
/// plus the configured TTL. The codec receives finished timestamps.
#[derive(Clone)]
pub struct TokenService {
    codec: TokenCodec,
    ttl_seconds: u64,
}

impl TokenService {
    pub fn new(codec: TokenCodec, ttl_seconds: u64) -> Self {
        Self { codec, ttl_seconds }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn issue_for(&self, user: &UserRecord) -> Result<IssuedToken, TokenError> {
        let now = Utc::now().timestamp();

        let claims = AccessTokenClaims {
            sub: user.id.clone(),
            email: user.email.clone(),
            aud: self.codec.audience().to_string(),
            exp: now + self.ttl_seconds as i64,
            iat: now,
            iss: self.codec.issuer().to_string(),
            nbf: now,
            username: user.username.clone(),
            roles: if user.roles.is_empty() {
                None
            } else {
                Some(user.roles.clone())
            },
            locale: user.locale.clone(),
            timezone: user.timezone.clone(),
        };

        let access_token = self.codec.create(&claims)?;
        Ok(IssuedToken {
            access_token,
            expires_in: self.ttl_seconds,
        })
    }
}
