use axum::Json;
use axum::extract::{Form, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use tracing::{error, info};

use crate::api::v1::dto::{token_request::TokenRequest, token_response::TokenResponse};
use crate::error::AppError;
use crate::services::auth::password;
use crate::state::AppState;

/// `POST {token_path}` — client_credentials token issuance.
///
/// Credentials come from an Authorization: Basic header or the form body;
/// the header takes precedence. A principal without a stored password hash
/// (federated) is authenticated by the lookup alone.
pub async fn token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<TokenRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let realm = &state.config.issuer;

    let grant_type = form.grant_type.as_deref().unwrap_or_default();
    info!(grant_type, "token: processing grant");
    if grant_type != "client_credentials" {
        info!(grant_type, "token: grant type is not supported");
        return Err(AppError::unauthorized(
            realm,
            "unsupported_grant_type",
            "The provided grant_type is not supported.",
        ));
    }

    let (client_id, client_secret) = match headers.get(header::AUTHORIZATION) {
        Some(value) => parse_basic(value).ok_or_else(|| {
            AppError::unauthorized(realm, "invalid_client", "Credentials are not valid.")
        })?,
        None => (
            form.client_id.unwrap_or_default(),
            form.client_secret.unwrap_or_default(),
        ),
    };

    let user = state.users.find_by_id(&client_id).await.map_err(|err| {
        error!(%client_id, error = %err, "token: user lookup failed");
        AppError::server_error(realm)
    })?;

    let Some(user) = user else {
        info!(%client_id, "token: unknown client");
        return Err(AppError::unauthorized(
            realm,
            "invalid_client",
            "Credentials are not valid.",
        ));
    };

    if let Some(hash) = &user.password {
        let valid = password::verify_password(&client_secret, hash).map_err(|err| {
            error!(%client_id, error = %err, "token: password verification errored");
            AppError::server_error(realm)
        })?;
        if !valid {
            info!(%client_id, "token: invalid client secret");
            return Err(AppError::unauthorized(
                realm,
                "invalid_client",
                "Credentials are not valid.",
            ));
        }
    }

    let issued = state.tokens.issue_for(&user).map_err(|err| {
        error!(%client_id, error = %err, "token: signing failed");
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

// Authorization: Basic base64(client_id:client_secret)
fn parse_basic(value: &HeaderValue) -> Option<(String, String)> {
    let value = value.to_str().ok()?;
    let encoded = value.split_whitespace().nth(1)?;
    let decoded = BASE64_STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (client_id, client_secret) = decoded.split_once(':')?;
    Some((client_id.to_string(), client_secret.to_string()))
}
