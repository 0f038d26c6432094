use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{discovery, introspect, sso, token, userinfo};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let config = state.config.clone();

    // Only userinfo requires a locally verified bearer; the SSO exchange
    // forwards its bearer to the provider instead.
    let protected = middleware::auth::apply(
        Router::new().route(&config.userinfo_endpoint_path, get(userinfo::userinfo)),
        state.clone(),
    );

    Router::new()
        .route(&config.token_endpoint_path, post(token::token))
        .route(&config.authorization_endpoint_path, get(introspect::authorize))
        .route(&config.introspection_endpoint_path, post(introspect::introspect))
        .route(&config.revocation_endpoint_path, post(introspect::revoke))
        .route("/sso/authorize", post(sso::sso_authorize))
        .route("/.well-known/jwks.json", get(discovery::jwks))
        .route(
            "/.well-known/oauth-authorization-server",
            get(discovery::metadata),
        )
        .merge(protected)
        .with_state(state)
}
