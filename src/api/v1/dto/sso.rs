use serde::Deserialize;

/// JSON body for the SSO token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct SsoAuthorizeRequest {
    /// The external provider's discovery-document URL. Validated against the
    /// https + well-known allow-list before anything is fetched.
    #[serde(rename = "metadataUrl")]
    pub metadata_url: String,
}
