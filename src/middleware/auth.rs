//! Bearer-token verification middleware.
//!
//! Verifies the access token and stores the decoded claims in request
//! extensions for handlers that act on the caller's own identity
//! (`/userinfo`). Routes that only forward the bearer elsewhere (the SSO
//! exchange) extract it with [`bearer_token`] instead.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// Pull the bearer token out of the Authorization header.
///
/// A missing header and a missing token segment are reported separately;
/// both are safe, specific messages.
pub fn bearer_token<'a>(headers: &'a HeaderMap, realm: &str) -> Result<&'a str, AppError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::unauthorized(realm, "invalid_request", "Authorization header is missing.")
        })?;

    header
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| AppError::unauthorized(realm, "invalid_request", "Bearer token is missing."))
}

/// Apply bearer verification to every route in `router`.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let realm = &state.config.issuer;
    let token = bearer_token(req.headers(), realm)?;

    let claims = match state.tokens.codec().verify(token) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(error = %err, "access token verification failed");
            return Err(AppError::unauthorized_opaque(realm, "invalid_request"));
        }
    };

    // middleware → handler hand-off
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
