use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::usecases::subscriptions::SubscriptionError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Shorthand for a 400 with a client-facing message.
pub fn bad_request(message: impl Into<String>) -> Response {
    ErrorResponse::new(StatusCode::BAD_REQUEST, message).into_response()
}

impl IntoResponse for SubscriptionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            SubscriptionError::Validation(message) => message,
            SubscriptionError::NotFound => "subscription not found".to_string(),
            // Don't leak internal error detail to client
            SubscriptionError::Internal(_) => "Internal server error".to_string(),
        };

        ErrorResponse::new(status, message).into_response()
    }
}
