use serde::Serialize;

/// RFC 6749 token response.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Seconds until expiry.
    pub expires_in: u64,
    /// Always "Bearer".
    pub token_type: String,
}
