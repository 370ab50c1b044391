//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (verifies database)
//!
//! # Catalog (read-only)
//! GET  /games                  - Game listing (filter/search/order)
//! GET  /games/categories       - All taxonomies with their values
//! GET  /games/{id}             - Game detail
//!
//! # Cart
//! GET    /cart/items           - List own cart items
//! POST   /cart/items           - Add item {game_id, quantity} (201)
//! PATCH  /cart/items/{id}      - Update quantity; 0 deletes (200/204)
//! DELETE /cart/items/{id}      - Remove item (204)
//! DELETE /cart                 - Delete whole cart (204)
//! POST   /cart/merge           - Fold guest cart into user cart on login
//!
//! # Auth
//! POST /auth/register          - Create account (201)
//! POST /auth/login             - Log in, sets session cookie
//! POST /auth/logout            - Log out (204)
//! ```
//!
//! Cart identity: an authenticated user (session cookie) or an anonymous cart
//! token minted on the first guest add-to-cart. After login, the client calls
//! `POST /cart/merge` with its old token to carry the guest cart over.

pub mod auth;
pub mod cart;
pub mod games;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn games_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(games::index))
        .route("/categories", get(games::categories))
        .route("/{id}", get(games::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", delete(cart::clear))
        .route("/items", get(cart::list_items).post(cart::add_item))
        .route(
            "/items/{id}",
            axum::routing::patch(cart::update_item).delete(cart::remove_item),
        )
        .route("/merge", post(cart::merge))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/games", games_routes())
        .nest("/cart", cart_routes())
        .nest("/auth", auth_routes())
}
