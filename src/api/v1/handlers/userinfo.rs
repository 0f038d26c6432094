use axum::{Extension, Json};
use axum::extract::State;
use axum::http::StatusCode;
use tracing::{error, info};

use crate::api::v1::dto::userinfo::UserProfile;
use crate::error::AppError;
use crate::services::auth::jwt::AccessTokenClaims;
use crate::state::AppState;

/// `GET {userinfo_path}` — the caller's stored profile.
///
/// The bearer token is verified by the auth middleware, which puts the
/// decoded claims into request extensions.
pub async fn userinfo(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let user = state.users.find_by_id(&claims.sub).await.map_err(|err| {
        error!(subject = %claims.sub, error = %err, "userinfo: user lookup failed");
        AppError::server_error(&state.config.issuer)
    })?;

    let Some(user) = user else {
        info!(subject = %claims.sub, "userinfo: no user record");
        return Err(AppError::NotFound);
    };

    Ok((StatusCode::OK, Json(user.into())))
}
