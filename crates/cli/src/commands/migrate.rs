//! Database migration command.
//!
//! Runs the storefront migrations embedded from
//! `crates/storefront/migrations/` at build time.

use tracing::info;

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    info!("Storefront migrations complete");
    Ok(())
}
