use serde::Serialize;

/// JWKS document: the single active public key.
#[derive(Debug, Clone, Serialize)]
pub struct JwksResponse {
    pub keys: Vec<JwksKey>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JwksKey {
    pub kty: String,
    pub alg: String,
    pub kid: String,
    pub n: String,
    pub e: String,
}

/// RFC 8414-style authorization-server metadata.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataResponse {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub jwks_uri: String,
    pub registration_endpoint: String,
    pub grant_types_supported: Vec<String>,
    pub userinfo_endpoint: String,
    pub token_endpoint_auth_methods_supported: Vec<String>,
    pub token_endpoint_auth_signing_alg_values_supported: Vec<String>,
    pub service_documentation: String,
    pub introspection_endpoint: String,
    pub revocation_endpoint: String,
}
