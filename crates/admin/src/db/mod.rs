//! Database operations for the admin API.
//!
//! ## Tables
//!
//! - `category`, `product`, `variant`, `add_on`, `ready_date` - the catalog,
//!   scoped by owner
//! - `owner_profile` - business details
//! - `buyer`, `orders`, `order_item`, `order_item_add_on` - read, plus status
//!   updates
//! - `admin.session` - tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `migrations/` at the workspace root and run via:
//! ```bash
//! cargo run -p endulque-cli -- migrate
//! ```

pub mod categories;
pub mod options;
pub mod orders;
pub mod products;
pub mod profile;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use options::{AddOnRepository, ReadyDateRepository, VariantRepository};
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use profile::ProfileRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate name).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique violation to `Conflict`, anything else to `Database`.
    pub(crate) fn conflict_or(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_string());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
