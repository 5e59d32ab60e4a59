//! Unified error handling for admin.
//!
//! Error bodies are JSON: `{"error": "<message>"}`. Server-side and upstream
//! failures are captured to Sentry and answered with a generic message.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::db::orders::StatusChangeError;
use crate::models::InputError;
use crate::services::{AuthError, CatalogError, StorageError};

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Auth provider operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Request body rejected.
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Repository(e) => Self::Database(e),
            CatalogError::Storage(e) => Self::Storage(e),
        }
    }
}

impl From<StatusChangeError> for AppError {
    fn from(err: StatusChangeError) -> Self {
        match err {
            StatusChangeError::Repository(e) => Self::Database(e),
            e @ StatusChangeError::InvalidTransition { .. } => Self::BadRequest(e.to_string()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(err.body_text())
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Auth(AuthError::InvalidCredentials | AuthError::Unauthorized) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Auth(AuthError::NotOwner) => StatusCode::FORBIDDEN,
            Self::Auth(AuthError::WeakPassword(_)) | Self::Input(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Storage(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            Self::Auth(_) | Self::Storage(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }

    fn public_message(&self) -> String {
        match self {
            Self::Auth(_) | Self::Storage(_) if self.status() == StatusCode::BAD_GATEWAY => {
                "Upstream service error".to_string()
            }
            _ if self.is_server_error() => "Internal server error".to_string(),
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg)) | Self::BadRequest(msg) => msg.clone(),
            Self::Auth(e) => e.to_string(),
            Self::Storage(e) => e.to_string(),
            Self::Input(e) => e.to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let body = Json(json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Record an owner action for Sentry reports.
pub fn add_breadcrumb(category: &str, message: &str, actor: &str) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };
    breadcrumb.data.insert(
        "actor".to_string(),
        serde_json::Value::String(actor.to_string()),
    );
    sentry::add_breadcrumb(breadcrumb);
}
