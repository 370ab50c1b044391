//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed, signed cookie sessions using tower-sessions.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, cookie::Key};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "mm_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store and signed cookies.
///
/// # Arguments
///
/// * `pool` - `PostgreSQL` connection pool
/// * `config` - Storefront configuration (for the signing secret)
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    // The sessions table is created via migration, not at startup
    let store = PostgresStore::new(pool.clone());

    let is_secure = config.base_url.starts_with("https://");

    // Config guarantees the secret is at least 64 bytes
    let key = Key::derive_from(config.session_secret.expose_secret().as_bytes());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}
