use serde::Deserialize;

/// Form body for the token endpoint (`application/x-www-form-urlencoded`).
///
/// `grant_type` is deliberately a free string: an unsupported grant must be
/// answered with a 401 `unsupported_grant_type`, not a schema-validation
/// rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub grant_type: Option<String>,

    /// Client credentials. Ignored when an Authorization: Basic header is
    /// present (the header takes precedence).
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

/// Form body for the introspection endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct IntrospectionRequest {
    pub token: Option<String>,
}

/// Form body for the revocation endpoint (RFC 7009 shape).
#[derive(Debug, Clone, Deserialize)]
pub struct RevocationRequest {
    pub token: Option<String>,

    /// Accepted and ignored; there is no token store to consult.
    pub token_type_hint: Option<String>,
}
