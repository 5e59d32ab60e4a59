//! Database migration command.
//!
//! Applies every pending migration in the workspace `migrations/` directory.
//! Neither server runs migrations on startup.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run(database_url: &SecretString) -> Result<(), MigrationError> {
    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let migrator = sqlx::migrate!("../../migrations");
    tracing::info!(count = migrator.iter().count(), "Running migrations...");
    migrator.run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
