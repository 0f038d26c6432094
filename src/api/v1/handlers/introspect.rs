use axum::Json;
use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode};
use tracing::{info, warn};

use crate::api::v1::dto::introspection::IntrospectionResponse;
use crate::api::v1::dto::token_request::{IntrospectionRequest, RevocationRequest};
use crate::error::AppError;
use crate::middleware::auth::bearer_token;
use crate::services::auth::jwt::AccessTokenClaims;
use crate::state::AppState;

/// `GET {authorize_path}` — introspect the caller's own bearer token.
pub async fn authorize(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<IntrospectionResponse>), AppError> {
    let realm = &state.config.issuer;
    let token = bearer_token(&headers, realm)?;

    let claims = verify_opaque(&state, token, "authorize")?;
    Ok((StatusCode::OK, Json(claims.into())))
}

/// `POST {introspection_path}` — introspect a token from the form body.
pub async fn introspect(
    State(state): State<AppState>,
    Form(form): Form<IntrospectionRequest>,
) -> Result<(StatusCode, Json<IntrospectionResponse>), AppError> {
    let Some(token) = form.token.filter(|t| !t.is_empty()) else {
        return Err(AppError::invalid_request("The token field is required."));
    };

    let claims = verify_opaque(&state, &token, "introspect")?;
    Ok((StatusCode::OK, Json(claims.into())))
}

/// `POST {revocation_path}` — accept a revocation request.
///
/// There is no token store, so nothing is recorded: the token remains valid
/// until natural expiry and the request is acknowledged anyway.
pub async fn revoke(Form(form): Form<RevocationRequest>) -> Result<StatusCode, AppError> {
    if form.token.as_deref().unwrap_or_default().is_empty() {
        return Err(AppError::invalid_request("The token field is required."));
    }

    info!("revoke: accepted revocation request");
    Ok(StatusCode::OK)
}

// Every verification failure collapses to the same opaque 401; the specific
// cause only reaches the log.
fn verify_opaque(
    state: &AppState,
    token: &str,
    endpoint: &'static str,
) -> Result<AccessTokenClaims, AppError> {
    state.tokens.codec().verify(token).map_err(|err| {
        warn!(endpoint, error = %err, "token verification failed");
        AppError::unauthorized_opaque(&state.config.issuer, "invalid_request")
    })
}
