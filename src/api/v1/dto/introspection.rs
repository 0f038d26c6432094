use serde::Serialize;

use crate::repos::user_store::RoleRef;
use crate::services::auth::jwt::AccessTokenClaims;

/// RFC 7662-style introspection response, projected from verified claims.
///
/// Only `active: true` responses are ever produced; a token that fails
/// verification is answered with the opaque 401, never with
/// `active: false`.
#[derive(Debug, Clone, Serialize)]
pub struct IntrospectionResponse {
    pub active: bool,
    pub aud: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub nbf: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<RoleRef>>,
    pub sub: String,
    pub token_type: String,
    pub username: String,
}

impl From<AccessTokenClaims> for IntrospectionResponse {
    fn from(claims: AccessTokenClaims) -> Self {
        Self {
            active: true,
            aud: claims.aud,
            email: claims.email,
            exp: claims.exp,
            iat: claims.iat,
            iss: claims.iss,
            nbf: claims.nbf,
            roles: claims.roles,
            sub: claims.sub,
            token_type: "Bearer".to_string(),
            username: claims.username,
        }
    }
}
