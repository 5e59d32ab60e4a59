//! Say! Endulque CLI - database migrations and sample data.
//!
//! # Usage
//!
//! ```bash
//! # Run all pending migrations
//! endulque-cli migrate
//!
//! # Insert a sample catalog for the configured owner
//! endulque-cli seed
//!
//! # Seed even if the owner already has products
//! endulque-cli seed --force
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string (or `--database-url`)
//! - `OWNER_ID` - Owner whose catalog is seeded (or `--owner-id`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;

use endulque_core::OwnerId;

mod commands;

#[derive(Parser)]
#[command(name = "endulque-cli")]
#[command(author, version, about = "Say! Endulque CLI tools")]
struct Cli {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert a sample catalog
    Seed {
        /// Owner whose catalog is seeded
        #[arg(long, env = "OWNER_ID")]
        owner_id: String,

        /// Seed even if the owner already has products
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = cli
        .database_url
        .map(SecretString::from)
        .ok_or("DATABASE_URL not set")?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&database_url).await?,
        Commands::Seed { owner_id, force } => {
            let owner = owner_id
                .parse::<OwnerId>()
                .map_err(|e| format!("invalid OWNER_ID: {e}"))?;
            commands::seed::run(&database_url, owner, force).await?;
        }
    }
    Ok(())
}
