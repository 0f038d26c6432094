use std::sync::Arc;

use jsonwebtoken::{Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repos::user_store::RoleRef;
use crate::services::auth::keys::{KEY_ID, KeyMaterial};

/// Access token claims.
///
/// All timestamps are epoch seconds and are supplied by the caller (the
/// issuer service), never computed here, so signing stays deterministic under
/// test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub email: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub nbf: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<RoleRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// Verification failures, distinguishable for logging and tests.
///
/// Handlers must collapse every one of these to the same opaque 401 —
/// the distinction never crosses the HTTP boundary.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("issuer mismatch")]
    IssuerMismatch,

    #[error("audience mismatch")]
    AudienceMismatch,

    #[error("algorithm not allowed")]
    AlgorithmNotAllowed,

    #[error("jwt error: {0}")]
    Other(jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        let mapped = match e.kind() {
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => Some(Self::Malformed),
            ErrorKind::InvalidSignature => Some(Self::InvalidSignature),
            ErrorKind::ExpiredSignature => Some(Self::Expired),
            ErrorKind::ImmatureSignature => Some(Self::NotYetValid),
            ErrorKind::InvalidIssuer => Some(Self::IssuerMismatch),
            ErrorKind::InvalidAudience => Some(Self::AudienceMismatch),
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                Some(Self::AlgorithmNotAllowed)
            }
            _ => None,
        };

        mapped.unwrap_or(Self::Other(e))
    }
}

/// Creates and verifies signed access tokens.
#[derive(Clone)]
pub struct TokenCodec {
    keys: Arc<KeyMaterial>,
    issuer: String,
    audience: String,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(keys: Arc<KeyMaterial>, issuer: String, audience: String) -> Self {
        let mut validation = Validation::new(keys.jwt_algorithm());
        validation.set_issuer(&[&issuer]);
        validation.set_audience(&[&audience]);
        validation.validate_nbf = true;
        // A token one second past exp must already fail.
        validation.leeway = 0;

        Self {
            keys,
            issuer,
            audience,
            validation,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Sign `claims` into a compact JWT with the fixed header
    /// `{alg, typ: "JWT", kid: "sst"}`.
    pub fn create(&self, claims: &AccessTokenClaims) -> Result<String, TokenError> {
        let mut header = Header::new(self.keys.jwt_algorithm());
        header.typ = Some("JWT".to_string());
        header.kid = Some(KEY_ID.to_string());

        Ok(jsonwebtoken::encode(
            &header,
            claims,
            self.keys.encoding_key(),
        )?)
    }

    /// Verify signature, `exp`, `nbf`, issuer, audience, and the algorithm
    /// allow-list, returning the decoded claims.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, TokenError> {
        let data = jsonwebtoken::decode::<AccessTokenClaims>(
            token,
            self.keys.decoding_key(),
            &self.validation,
        )?;

        Ok(data.claims)
    }
}
