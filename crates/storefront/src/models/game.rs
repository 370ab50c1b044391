//! Catalog models.
//!
//! The cart core treats the catalog as a read-only collaborator: it looks up
//! games by id and reads `price` and `stock`. The richer read models below
//! back the public catalog endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use meeplemart_core::{GameId, Price};

/// Full catalog entry for the game detail endpoint.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Game {
    pub id: GameId,
    pub title: String,
    pub description: String,
    pub rules_summary: String,
    pub release_year: i32,
    pub price: Price,
    /// Sale price; equals `price` when the game is not discounted.
    pub discount_price: Price,
    pub stock: i32,
    pub publisher: String,
    pub player_count: String,
    pub age_group: String,
    pub difficulty: String,
    pub duration: String,
    pub genres: Vec<String>,
    pub mechanics: Vec<String>,
    pub game_types: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact catalog entry for list endpoints.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GameSummary {
    pub id: GameId,
    pub title: String,
    pub release_year: i32,
    pub price: Price,
    pub discount_price: Price,
    pub stock: i32,
    pub publisher: String,
}

/// The slice of a game the cart core reads: current price and stock.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct GamePricing {
    pub price: Price,
    pub stock: i32,
}

/// One taxonomy value (e.g. genre "Eurogame").
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryEntry {
    pub id: i32,
    pub name: String,
}

/// A taxonomy with all its values, for the categories endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    /// Machine name, matching the list-endpoint filter parameter.
    pub name: &'static str,
    /// Human-readable name.
    pub display_name: &'static str,
    pub values: Vec<CategoryEntry>,
}
