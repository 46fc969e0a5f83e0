//! Unified error handling with Sentry integration.
//!
//! Every failure leaves the service as the JSON envelope callers already
//! parse: `{ "success": false, "error": "..." }`. Server errors are captured
//! to Sentry before responding and their details never reach the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use quickcart_core::CreateOrderResponse;

use crate::db::RepositoryError;

/// Application-level error type for the order service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Creating an order failed after validation; nothing was written.
    #[error("Order creation failed: {0}")]
    OrderCreation(RepositoryError),

    /// Any other storage failure.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request conflicts with the resource's current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    /// Map a repository error to the matching client-facing error.
    #[must_use]
    pub fn from_repository(err: RepositoryError, what: &str) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound(what.to_string()),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::OrderCreation(_) | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::OrderCreation(_) | Self::Database(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::OrderCreation(_) => "Failed to create order".to_string(),
            Self::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (self.status(), Json(CreateOrderResponse::failed(message))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
