use std::net::SocketAddr;
use std::str::FromStr;
use std::{env, fmt};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Signing algorithm for access tokens.
///
/// RS256 is the default; HS256 is supported as the symmetric alternative and
/// reuses `JWT_PRIVATE_KEY` as the shared secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAlgorithm {
    Rs256,
    Hs256,
}

impl TokenAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rs256 => "RS256",
            Self::Hs256 => "HS256",
        }
    }
}

impl FromStr for TokenAlgorithm {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RS256" => Ok(Self::Rs256),
            "HS256" => Ok(Self::Hs256),
            _ => Err(()),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub database_url: String,
    pub issuer: String,
    pub audience: String,
    pub algorithm: TokenAlgorithm,
    // The server signs access tokens with this key (shared secret for HS256).
    pub jwt_private_key_pem: String,
    // Verification half; not required for HS256.
    pub jwt_public_key_pem: Option<String>,
    pub token_ttl_seconds: u64,
    pub request_timeout_seconds: u64,
    // Endpoint paths advertised in the discovery document and mounted as routes.
    pub authorization_endpoint_path: String,
    pub token_endpoint_path: String,
    pub introspection_endpoint_path: String,
    pub revocation_endpoint_path: String,
    pub userinfo_endpoint_path: String,
    pub registration_endpoint_path: String,
    pub service_documentation_endpoint_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let issuer = env::var("TOKEN_ISSUER")
            .unwrap_or_else(|_| "https://auth.example.com".to_string());
        let audience = env::var("TOKEN_AUDIENCE").unwrap_or_else(|_| "api".to_string());

        let algorithm = env::var("TOKEN_ALGORITHM")
            .unwrap_or_else(|_| "RS256".to_string())
            .parse::<TokenAlgorithm>()
            .map_err(|_| ConfigError::Invalid("TOKEN_ALGORITHM"))?;

        let jwt_private_key_pem = env::var("JWT_PRIVATE_KEY")
            .map_err(|_| ConfigError::Missing("JWT_PRIVATE_KEY"))?
            .replace("\\n", "\n");
        let jwt_public_key_pem = env::var("JWT_PUBLIC_KEY")
            .ok()
            .map(|s| s.replace("\\n", "\n"));
        if algorithm == TokenAlgorithm::Rs256 && jwt_public_key_pem.is_none() {
            return Err(ConfigError::Missing("JWT_PUBLIC_KEY"));
        }

        let token_ttl_seconds = env::var("TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600); // 1 hour
        let request_timeout_seconds = env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Config {
            addr,
            app_env,
            database_url,
            issuer,
            audience,
            algorithm,
            jwt_private_key_pem,
            jwt_public_key_pem,
            token_ttl_seconds,
            request_timeout_seconds,
            authorization_endpoint_path: path_var("AUTHORIZATION_ENDPOINT_PATH", "/authorize")?,
            token_endpoint_path: path_var("TOKEN_ENDPOINT_PATH", "/token")?,
            introspection_endpoint_path: path_var("INTROSPECTION_ENDPOINT_PATH", "/introspect")?,
            revocation_endpoint_path: path_var("REVOCATION_ENDPOINT_PATH", "/revoke")?,
            userinfo_endpoint_path: path_var("USERINFO_ENDPOINT_PATH", "/userinfo")?,
            registration_endpoint_path: path_var("REGISTRATION_ENDPOINT_PATH", "/user")?,
            service_documentation_endpoint_path: path_var(
                "SERVICE_DOCUMENTATION_ENDPOINT_PATH",
                "/reference",
            )?,
        })
    }
}

// Endpoint paths are mounted as axum routes, so a value without a leading
// slash is a startup error rather than a 404 at runtime.
fn path_var(key: &'static str, default: &str) -> Result<String, ConfigError> {
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    if !value.starts_with('/') {
        return Err(ConfigError::Invalid(key));
    }
    Ok(value)
}

impl From<ConfigError> for AppError {
    fn from(_: ConfigError) -> Self {
        AppError::Internal
    }
}
