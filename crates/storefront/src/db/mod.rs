//! Database operations for the storefront `PostgreSQL` database.
//!
//! # Tables (schema `storefront`)
//!
//! - `users` / `user_password` - Site accounts
//! - `publisher` + taxonomy tables (`genre`, `mechanic`, `game_type`,
//!   `player_count`, `age_group`, `difficulty_level`, `duration`)
//! - `game` + taxonomy join tables - The catalog
//! - `cart` / `cart_item` - Shopping carts (user- or session-keyed)
//! - `orders` / `order_item` / `shipment` - Placed orders
//!
//! The `tower_sessions` schema holds cookie-session state.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p meeplemart-cli -- migrate
//! ```
//!
//! Queries use sqlx's runtime API (`query_as`, `QueryBuilder`) rather than the
//! compile-time macros; this workspace carries no offline query cache.

pub mod carts;
pub mod games;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use games::GameRepository;
pub use users::UserRepository;

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

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a sqlx error, translating unique violations into [`RepositoryError::Conflict`].
pub(crate) fn map_unique_violation(e: sqlx::Error, conflict_msg: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(conflict_msg.to_owned());
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
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
