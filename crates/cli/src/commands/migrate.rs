//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! qc-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ORDER_SERVICE_DATABASE_URL` - `PostgreSQL` connection string for the order service
//! - `DATABASE_URL` - Fallback when the above is unset
//!
//! # Migration Files
//!
//! Order service migrations: `crates/order-service/migrations/`

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run order service database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if no database URL is configured, the database
/// is unreachable, or a migration fails.
pub async fn order_service(database_url: Option<String>) -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = resolve_database_url(database_url)?;

    tracing::info!("Connecting to order service database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running order service migrations...");
    sqlx::migrate!("../order-service/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Order service migrations complete!");
    Ok(())
}

fn resolve_database_url(explicit: Option<String>) -> Result<SecretString, MigrationError> {
    explicit
        .or_else(|| std::env::var("ORDER_SERVICE_DATABASE_URL").ok())
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .map(SecretString::from)
        .ok_or(MigrationError::MissingEnvVar("ORDER_SERVICE_DATABASE_URL"))
}
