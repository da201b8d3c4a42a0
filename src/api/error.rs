use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::AppError;

/// Body of every non-2xx response.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error returned by handlers; renders as `{"message": ...}`.
#[derive(Debug)]
pub enum ApiError {
    /// The request could not be read (malformed body, path or query).
    BadRequest(String),
    Unauthorized(String),
    App(AppError),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::App(err) => match err {
                AppError::UserNotFound(_)
                | AppError::TransactionNotFound(_)
                | AppError::CategoryNotFound(_)
                | AppError::GoalNotFound(_)
                | AppError::BudgetNotFound(_)
                | AppError::RecurrenceNotFound(_) => StatusCode::NOT_FOUND,
                AppError::EmailAlreadyRegistered(_)
                | AppError::InvalidAmount(_)
                | AppError::InvalidDate(_)
                | AppError::InvalidInput(_)
                | AppError::InvalidProjection(_) => StatusCode::BAD_REQUEST,
                AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(message) | ApiError::Unauthorized(message) => message,
            ApiError::App(AppError::Database(err)) => {
                // Storage details stay in the log.
                tracing::error!(error = ?err, "request failed");
                "Internal server error".to_string()
            }
            ApiError::App(err) => err.to_string(),
        };
        (status, Json(MessageBody::new(message))).into_response()
    }
}
