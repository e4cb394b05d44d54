//! HTTP error mapping for API handlers.

use crate::AppError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error returned by handlers; renders as `{"error": "..."}`.
#[derive(Debug)]
pub enum HttpError {
    /// Domain or storage failure from the core.
    App(AppError),
    /// Request body could not be decoded.
    Rejected { status: StatusCode, message: String },
    /// Blocking worker panicked or was cancelled.
    Internal,
}

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        Self::App(value)
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        // Malformed JSON and wrongly typed fields are both plain client errors.
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::Rejected {
            status,
            message: rejection.body_text(),
        }
    }
}

impl HttpError {
    /// Whether this error means the paste is not (or no longer) available.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::App(AppError::NotFound))
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::App(err) if err.is_client_error() => {
                let status = match err {
                    AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, err.to_string())
            }
            Self::App(AppError::NotFound) => (StatusCode::NOT_FOUND, "not found".to_string()),
            Self::App(AppError::StoreUnavailable(msg)) => {
                tracing::error!("Store unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store unavailable".to_string(),
                )
            }
            Self::App(err) => {
                tracing::error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            Self::Rejected { status, message } => (*status, message.clone()),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}
