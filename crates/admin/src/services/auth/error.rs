//! Auth provider error types.

use thiserror::Error;

/// Errors from the managed auth provider.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password rejected.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Signed in, but not as the shop owner.
    #[error("this account cannot manage the shop")]
    NotOwner,

    /// Access token expired or revoked.
    #[error("session expired, sign in again")]
    Unauthorized,

    /// New password too short.
    #[error("password must be at least {0} characters")]
    WeakPassword(usize),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Client could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Whether the provider itself failed, as opposed to rejecting input.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Api { .. } | Self::Parse(_) | Self::Config(_)
        )
    }
}
