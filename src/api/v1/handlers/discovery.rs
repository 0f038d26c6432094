use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::error;

use crate::api::v1::dto::discovery::{JwksKey, JwksResponse, MetadataResponse};
use crate::error::AppError;
use crate::services::auth::keys::KEY_ID;
use crate::state::AppState;

/// `GET /.well-known/jwks.json` — publish the signing public key.
pub async fn jwks(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<JwksResponse>), AppError> {
    let jwk = state.keys.public_jwk().map_err(|err| {
        error!(error = %err, "jwks: no publishable key");
        AppError::server_error(&state.config.issuer)
    })?;

    Ok((
        StatusCode::OK,
        Json(JwksResponse {
            keys: vec![JwksKey {
                kty: jwk.kty.to_string(),
                alg: state.config.algorithm.as_str().to_string(),
                kid: KEY_ID.to_string(),
                n: jwk.n.clone(),
                e: jwk.e.clone(),
            }],
        }),
    ))
}

/// `GET /.well-known/oauth-authorization-server` — discovery metadata built
/// from the issuer and the configured endpoint paths.
pub async fn metadata(State(state): State<AppState>) -> (StatusCode, Json<MetadataResponse>) {
    let config = &state.config;
    let issuer = &config.issuer;

    let document = MetadataResponse {
        issuer: issuer.clone(),
        authorization_endpoint: format!("{issuer}{}", config.authorization_endpoint_path),
        token_endpoint: format!("{issuer}{}", config.token_endpoint_path),
        jwks_uri: format!("{issuer}/.well-known/jwks.json"),
        registration_endpoint: format!("{issuer}{}", config.registration_endpoint_path),
        grant_types_supported: vec!["client_credentials".to_string()],
        userinfo_endpoint: format!("{issuer}{}", config.userinfo_endpoint_path),
        token_endpoint_auth_methods_supported: vec![
            "client_secret_basic".to_string(),
            "client_secret_post".to_string(),
        ],
        token_endpoint_auth_signing_alg_values_supported: vec![
            "HS256".to_string(),
            "RS256".to_string(),
        ],
        service_documentation: format!(
            "{issuer}{}",
            config.service_documentation_endpoint_path
        ),
        introspection_endpoint: format!("{issuer}{}", config.introspection_endpoint_path),
        revocation_endpoint: format!("{issuer}{}", config.revocation_endpoint_path),
    };

    (StatusCode::OK, Json(document))
}
