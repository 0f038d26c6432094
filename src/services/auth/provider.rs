//! Trust validation for caller-supplied OIDC providers.
//!
//! The metadata URL arrives verbatim from the SSO exchange request, so this
//! is the SSRF-adjacent edge of the service: the URL allow-list (https only,
//! `/.well-known/openid-configuration` suffix) runs before any request is
//! made, and every response is validated before it is trusted.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

const WELL_KNOWN_SUFFIX: &str = "/.well-known/openid-configuration";

/// Provider-trust failures. One tagged enum rather than a hierarchy: the
/// orchestrator logs the variant and answers generically either way, but
/// `Unauthorized` stays distinct so callers can tell a rejected token from a
/// provider outage.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid provider url: {0}")]
    Url(String),

    #[error("provider request failed: {status} {status_text}")]
    Fetch { status: u16, status_text: String },

    #[error("provider rejected the bearer token")]
    Unauthorized,

    #[error("provider metadata is missing userinfo_endpoint")]
    Metadata,

    #[error("provider userinfo is missing a subject identifier")]
    Userinfo,

    #[error("provider transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// OIDC discovery document, unknown fields passed through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,
    pub userinfo_endpoint: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Deserialization target before the userinfo_endpoint requirement is
// enforced; its absence must be a ProviderError, not a serde error.
#[derive(Debug, Deserialize)]
struct RawProviderMetadata {
    #[serde(default)]
    authorization_endpoint: Option<String>,
    #[serde(default)]
    token_endpoint: Option<String>,
    #[serde(default)]
    userinfo_endpoint: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Provider-issued identity claims, unknown fields passed through.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUserinfo {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub oid: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProviderUserinfo {
    /// The provider subject: `sub`, falling back to `oid`. Empty strings
    /// count as absent.
    pub fn subject(&self) -> Option<&str> {
        self.sub
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.oid.as_deref().filter(|s| !s.is_empty()))
    }
}

#[derive(Clone)]
pub struct ProviderClient {
    http: Client,
    require_https: bool,
}

impl Default for ProviderClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
            require_https: true,
        }
    }

    // Mock servers only speak plain http.
    #[cfg(test)]
    pub(crate) fn allowing_http() -> Self {
        Self {
            http: Client::new(),
            require_https: false,
        }
    }

    fn validate_url(&self, raw: &str) -> Result<Url, ProviderError> {
        if raw.is_empty() {
            return Err(ProviderError::Url("url is empty".to_string()));
        }
        let url =
            Url::parse(raw).map_err(|_| ProviderError::Url(format!("malformed url: {raw}")))?;
        if self.require_https && url.scheme() != "https" {
            return Err(ProviderError::Url(format!(
                "scheme must be https: {raw}"
            )));
        }
        Ok(url)
    }

    /// Fetch and validate an OIDC discovery document.
    pub async fn get_metadata(&self, raw_url: &str) -> Result<ProviderMetadata, ProviderError> {
        let url = self.validate_url(raw_url)?;
        if !url.path().ends_with(WELL_KNOWN_SUFFIX) {
            return Err(ProviderError::Url(format!(
                "url must end with {WELL_KNOWN_SUFFIX}: {raw_url}"
            )));
        }

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Fetch {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let raw: RawProviderMetadata = response.json().await?;
        let userinfo_endpoint = match raw.userinfo_endpoint {
            Some(endpoint) if !endpoint.is_empty() => endpoint,
            _ => return Err(ProviderError::Metadata),
        };

        Ok(ProviderMetadata {
            authorization_endpoint: raw.authorization_endpoint,
            token_endpoint: raw.token_endpoint,
            userinfo_endpoint,
            extra: raw.extra,
        })
    }

    /// Fetch the provider's userinfo with the caller's bearer token.
    pub async fn get_userinfo(
        &self,
        raw_url: &str,
        bearer_token: &str,
    ) -> Result<ProviderUserinfo, ProviderError> {
        let url = self.validate_url(raw_url)?;

        let response = self.http.get(url).bearer_auth(bearer_token).send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ProviderError::Fetch {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let userinfo: ProviderUserinfo = response.json().await?;
        if userinfo.subject().is_none() {
            return Err(ProviderError::Userinfo);
        }
        Ok(userinfo)
    }
}
