//! CLI command implementations.

pub mod migrate;
pub mod seed;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

/// Connect to the storefront database using the usual environment variables.
///
/// # Errors
///
/// Returns an error if no database URL is configured or the connection fails.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "STOREFRONT_DATABASE_URL (or DATABASE_URL) not set")?;

    let pool = PgPool::connect(database_url.expose_secret()).await?;
    Ok(pool)
}
