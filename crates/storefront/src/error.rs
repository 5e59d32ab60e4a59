//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Error bodies are JSON: `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::CartError;
use crate::services::OrderError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Order placement failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Cart change rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(RepositoryError::NotFound) => false,
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => true,
            Self::Order(err) => matches!(err, OrderError::Repository(_)),
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Cart(CartError::ItemNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Cart(CartError::ProductUnavailable(_)) => StatusCode::CONFLICT,
            Self::Order(OrderError::Validation(_)) | Self::Cart(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Database(_) | Self::Order(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn public_message(&self) -> String {
        if self.is_server_error() {
            return "Internal server error".to_string();
        }
        match self {
            Self::Database(_) => "Not found".to_string(),
            Self::Order(OrderError::Validation(err)) => err.to_string(),
            Self::Cart(err) => err.to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::BadRequest(msg) => msg.clone(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let body = Json(json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use endulque_core::{OrderValidationError, ProductId};

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(OrderError::Validation(OrderValidationError::EmptyCart).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CartError::ProductUnavailable(ProductId::new(1)).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(CartError::ItemNotFound(3).into()),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_blank_buyer_field_is_bad_request() {
        let err: AppError =
            OrderError::Validation(OrderValidationError::MissingBuyerField("name")).into();
        assert_eq!(err.public_message(), "buyer name is required");
        assert_eq!(get_status(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption("secret row".to_string()));
        assert_eq!(err.public_message(), "Internal server error");
        let err: AppError = OrderError::Repository(RepositoryError::NotFound).into();
        assert_eq!(err.public_message(), "Internal server error");
    }
}
