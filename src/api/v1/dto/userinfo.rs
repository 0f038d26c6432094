use serde::Serialize;

use crate::repos::user_store::{RoleRef, UserRecord};

/// Caller profile returned by the userinfo endpoint.
///
/// Projected from the stored record; the password hash is deliberately not
/// part of this type so it cannot serialize outward.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(rename = "verifiedEmail")]
    pub verified_email: bool,
    #[serde(rename = "authType", skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,
    #[serde(rename = "idpMetadataUrl", skip_serializing_if = "Option::is_none")]
    pub idp_metadata_url: Option<String>,
    pub roles: Vec<RoleRef>,
}

impl From<UserRecord> for UserProfile {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            phone: user.phone,
            locale: user.locale,
            timezone: user.timezone,
            verified_email: user.verified_email,
            auth_type: user.auth_type,
            idp_metadata_url: user.idp_metadata_url,
            roles: user.roles,
        }
    }
}
