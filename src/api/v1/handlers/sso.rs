use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use tracing::{error, info};

use crate::api::v1::dto::sso::SsoAuthorizeRequest;
use crate::api::v1::dto::token_response::TokenResponse;
use crate::error::AppError;
use crate::middleware::auth::bearer_token;
use crate::repos::user_store::UserUpdate;
use crate::services::auth::provider::ProviderUserinfo;
use crate::state::AppState;

/// `POST /sso/authorize` — exchange a trusted provider's identity for a
/// local token.
///
/// The bearer token belongs to the external provider and is forwarded to its
/// userinfo endpoint, not verified locally. The steps are strictly
/// sequential: metadata → userinfo → record update → minting; each failure
/// surfaces as a generic 500 with the detail logged.
pub async fn sso_authorize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SsoAuthorizeRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let realm = &state.config.issuer;
    let bearer = bearer_token(&headers, realm)?;

    let metadata = state
        .provider
        .get_metadata(&body.metadata_url)
        .await
        .map_err(|err| {
            error!(metadata_url = %body.metadata_url, error = %err, "sso: provider metadata rejected");
            AppError::server_error(realm)
        })?;

    let userinfo = state
        .provider
        .get_userinfo(&metadata.userinfo_endpoint, bearer)
        .await
        .map_err(|err| {
            error!(error = %err, "sso: provider userinfo rejected");
            AppError::server_error(realm)
        })?;

    let Some(subject) = userinfo.subject().map(str::to_string) else {
        error!("sso: provider userinfo has no subject identifier");
        return Err(AppError::server_error(realm));
    };

    let updates = user_updates(&userinfo, &body.metadata_url);
    let updated = state.users.update(&subject, updates).await.map_err(|err| {
        error!(%subject, error = %err, "sso: user update failed");
        AppError::server_error(realm)
    })?;

    // Update-only: an unknown subject (first-time federated login with no
    // pre-provisioned record) yields no row and fails here.
    let Some(user) = updated else {
        error!(%subject, "sso: no local user record to update");
        return Err(AppError::server_error(realm));
    };
    info!(%subject, "sso: updated user from provider userinfo");

    let issued = state.tokens.issue_for(&user).map_err(|err| {
        error!(%subject, error = %err, "sso: signing failed");
        AppError::server_error(realm)
    })?;

    Ok((
        StatusCode::OK,
        Json(TokenResponse {
            access_token: issued.access_token,
            expires_in: issued.expires_in,
            token_type: "Bearer".to_string(),
        }),
    ))
}

// Merge only the provider fields that are present and non-empty, plus the
// fixed federated-auth markers.
fn user_updates(userinfo: &ProviderUserinfo, metadata_url: &str) -> UserUpdate {
    let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());

    UserUpdate {
        username: non_empty(&userinfo.username),
        email: non_empty(&userinfo.email),
        locale: non_empty(&userinfo.locale),
        phone: non_empty(&userinfo.phone),
        timezone: non_empty(&userinfo.timezone),
        auth_type: Some("oidc".to_string()),
        verified_email: Some(true),
        idp_metadata_url: Some(metadata_url.to_string()),
    }
}
