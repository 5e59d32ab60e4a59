//! Database operations for the storefront.
//!
//! ## Tables read
//!
//! - `category`, `product`, `variant`, `add_on`, `ready_date` - the menu
//!
//! ## Tables written
//!
//! - `buyer`, `orders`, `order_item`, `order_item_add_on` - order placement
//! - `storefront.session` - tower-sessions storage (cart)
//!
//! # Migrations
//!
//! Migrations are stored in `migrations/` at the workspace root and run via:
//! ```bash
//! cargo run -p endulque-cli -- migrate
//! ```

pub mod menu;
pub mod orders;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use menu::MenuRepository;
pub use orders::PgOrderWriter;

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
