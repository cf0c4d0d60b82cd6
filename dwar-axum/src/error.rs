use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dwar::DwarError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    AuthenticationFailed(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Failed to deliver one-time code: {0}")]
    DeliveryFailed(String),

    #[error("Internal server error")]
    InternalError(String),
}

impl From<DwarError> for ApiError {
    fn from(err: DwarError) -> Self {
        match err {
            DwarError::Validation(msg) => ApiError::BadRequest(msg),
            // Wrong password, wrong code, expired code: all 400 to the caller
            DwarError::Auth(msg) | DwarError::Expired(msg) => ApiError::AuthenticationFailed(msg),
            DwarError::Forbidden(msg) => ApiError::Forbidden(msg),
            DwarError::NotFound(msg) => ApiError::NotFound(msg),
            DwarError::Unauthorized(_) => ApiError::Unauthorized,
            DwarError::Delivery(msg) => ApiError::DeliveryFailed(msg),
            DwarError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            ApiError::AuthenticationFailed(ref msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::Forbidden(ref msg) => (StatusCode::FORBIDDEN, msg.as_str()),
            ApiError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.as_str()),
            ApiError::DeliveryFailed(ref msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.as_str()),
            ApiError::InternalError(ref msg) => {
                // Storage and signing details stay in the logs
                tracing::error!(error = msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "statusCode": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
