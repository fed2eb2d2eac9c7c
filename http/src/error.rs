use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use asr_application::ApplicationError;

const INTERNAL_MESSAGE: &str = "Internal server error";
const TIMEOUT_MESSAGE: &str = "Request timed out";

#[derive(Debug)]
pub enum HttpError {
    BadRequest { message: String },
    PayloadTooLarge { message: String },
    Timeout,
    Internal,
}

impl HttpError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            HttpError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            HttpError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            HttpError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            HttpError::BadRequest { message } | HttpError::PayloadTooLarge { message } => message,
            HttpError::Timeout => TIMEOUT_MESSAGE.to_string(),
            HttpError::Internal => INTERNAL_MESSAGE.to_string(),
        };

        (
            status,
            Json(json!({
                "error": message,
            })),
        )
            .into_response()
    }
}

/// Client errors keep their message; server-side details stay in the logs.
pub fn error_mapper(error: ApplicationError) -> HttpError {
    match error {
        ApplicationError::Timeout(_) => HttpError::Timeout,
        error if error.is_client_error() => HttpError::bad_request(error.to_string()),
        error => {
            tracing::error!(error = %error, details = ?error, "request failed");
            HttpError::Internal
        }
    }
}
