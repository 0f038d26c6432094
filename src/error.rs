use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Application-level error, already collapsed to the external taxonomy.
///
/// Component errors (`TokenError`, `ProviderError`, `StoreError`, ...) stay
/// typed inside their modules for logging and tests; handlers map them into
/// one of these variants before responding, so internal detail never reaches
/// the response body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("unauthorized")]
    Unauthorized {
        realm: String,
        error_code: &'static str,
        // Some(_) for safe, specific messages (missing header, bad grant).
        // None for opaque authentication failures.
        message: Option<String>,
    },

    #[error("not found")]
    NotFound,

    #[error("internal server error")]
    ServerError { realm: String },

    #[error("internal server error")]
    Internal,

    #[error("request timed out")]
    Timeout,
}

impl AppError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(
        realm: impl Into<String>,
        error_code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::Unauthorized {
            realm: realm.into(),
            error_code,
            message: Some(message.into()),
        }
    }

    /// Opaque 401: same body for every authentication failure cause.
    pub fn unauthorized_opaque(realm: impl Into<String>, error_code: &'static str) -> Self {
        Self::Unauthorized {
            realm: realm.into(),
            error_code,
            message: None,
        }
    }

    pub fn server_error(realm: impl Into<String>) -> Self {
        Self::ServerError {
            realm: realm.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
    message: String,
    #[serde(rename = "statusCode")]
    status_code: u16,
}

fn bearer_challenge(realm: &str, error_code: &str, description: Option<&str>) -> HeaderValue {
    let value = match description {
        Some(description) => format!(
            "Bearer realm=\"{realm}\", error=\"{error_code}\", error_description=\"{description}\""
        ),
        None => format!("Bearer realm=\"{realm}\", error=\"{error_code}\""),
    };
    // Realm and codes come from configuration, not request input.
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("Bearer"))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message, challenge) = match self {
            AppError::InvalidRequest { message } => {
                (StatusCode::BAD_REQUEST, Some("invalid_request"), message, None)
            }
            AppError::Unauthorized {
                realm,
                error_code,
                message,
            } => {
                let challenge = bearer_challenge(&realm, error_code, message.as_deref());
                (
                    StatusCode::UNAUTHORIZED,
                    Some(error_code),
                    message.unwrap_or_else(|| "Unauthorized".to_string()),
                    Some(challenge),
                )
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, None, "Not Found".to_string(), None),
            AppError::ServerError { realm } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Some("invalid_request"),
                "Internal Server Error".to_string(),
                Some(bearer_challenge(&realm, "invalid_request", None)),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                None,
                "Internal Server Error".to_string(),
                None,
            ),
            AppError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                None,
                "The request timed out.".to_string(),
                None,
            ),
        };

        let body = ErrorResponseBody {
            error,
            message,
            status_code: status.as_u16(),
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(challenge) = challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, challenge);
        }
        response
    }
}
