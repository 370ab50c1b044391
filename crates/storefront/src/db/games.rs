//! Catalog repository.
//!
//! Read-only over HTTP: catalog writes happen through seeding. The cart core
//! only ever consumes `GamePricing` (price + stock) out of this store.

use sqlx::{PgPool, QueryBuilder};

use meeplemart_core::GameId;
use rust_decimal::Decimal;

use super::RepositoryError;
use crate::models::game::{CategoryEntry, CategoryGroup, Game, GameSummary};

/// Sort order for game listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameOrdering {
    /// Newest first (default).
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    DiscountPriceAsc,
    DiscountPriceDesc,
}

impl GameOrdering {
    /// Parse an ordering parameter (`-created_at`, `price`, ...); a leading `-`
    /// means descending.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "-created_at" => Some(Self::Newest),
            "created_at" => Some(Self::Oldest),
            "price" => Some(Self::PriceAsc),
            "-price" => Some(Self::PriceDesc),
            "discount_price" => Some(Self::DiscountPriceAsc),
            "-discount_price" => Some(Self::DiscountPriceDesc),
            _ => None,
        }
    }

    const fn order_clause(self) -> &'static str {
        match self {
            Self::Newest => " ORDER BY g.created_at DESC",
            Self::Oldest => " ORDER BY g.created_at ASC",
            Self::PriceAsc => " ORDER BY g.price ASC",
            Self::PriceDesc => " ORDER BY g.price DESC",
            Self::DiscountPriceAsc => " ORDER BY g.discount_price ASC",
            Self::DiscountPriceDesc => " ORDER BY g.discount_price DESC",
        }
    }
}

/// Filters for the game list endpoint.
///
/// Price bounds are validated at the route layer (non-negative, min <= max)
/// before reaching the repository.
#[derive(Debug, Clone, Default)]
pub struct GameListFilter {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub genre: Vec<i32>,
    pub game_type: Vec<i32>,
    pub mechanic: Vec<i32>,
    pub player_count: Option<i32>,
    pub age_group: Option<i32>,
    pub difficulty: Option<i32>,
    pub duration: Option<i32>,
    pub search: Option<String>,
    pub ordering: GameOrdering,
}

/// Escape LIKE wildcards in user-supplied search input.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

const GAME_DETAIL_SQL: &str = r"
    SELECT g.id, g.title, g.description, g.rules_summary, g.release_year,
           g.price, g.discount_price, g.stock,
           p.name AS publisher,
           pc.name AS player_count,
           ag.name AS age_group,
           dl.name AS difficulty,
           du.name AS duration,
           COALESCE((SELECT array_agg(x.name ORDER BY x.name)
                     FROM storefront.game_genre l
                     JOIN storefront.genre x ON x.id = l.genre_id
                     WHERE l.game_id = g.id), '{}'::text[]) AS genres,
           COALESCE((SELECT array_agg(x.name ORDER BY x.name)
                     FROM storefront.game_mechanic l
                     JOIN storefront.mechanic x ON x.id = l.mechanic_id
                     WHERE l.game_id = g.id), '{}'::text[]) AS mechanics,
           COALESCE((SELECT array_agg(x.name ORDER BY x.name)
                     FROM storefront.game_game_type l
                     JOIN storefront.game_type x ON x.id = l.game_type_id
                     WHERE l.game_id = g.id), '{}'::text[]) AS game_types,
           g.created_at, g.updated_at
    FROM storefront.game g
    JOIN storefront.publisher p ON p.id = g.publisher_id
    JOIN storefront.player_count pc ON pc.id = g.player_count_id
    JOIN storefront.age_group ag ON ag.id = g.age_group_id
    JOIN storefront.difficulty_level dl ON dl.id = g.difficulty_id
    JOIN storefront.duration du ON du.id = g.duration_id
    WHERE g.id = $1
";

/// Repository for catalog reads.
pub struct GameRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GameRepository<'a> {
    /// Create a new game repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a full game record by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: GameId) -> Result<Option<Game>, RepositoryError> {
        let game: Option<Game> = sqlx::query_as(GAME_DETAIL_SQL)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(game)
    }

    /// List games matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &GameListFilter) -> Result<Vec<GameSummary>, RepositoryError> {
        let mut qb: QueryBuilder<'_, sqlx::Postgres> = QueryBuilder::new(
            "SELECT g.id, g.title, g.release_year, g.price, g.discount_price, g.stock, \
             p.name AS publisher \
             FROM storefront.game g \
             JOIN storefront.publisher p ON p.id = g.publisher_id \
             WHERE TRUE",
        );

        if let Some(min_price) = filter.min_price {
            qb.push(" AND g.price >= ").push_bind(min_price);
        }
        if let Some(max_price) = filter.max_price {
            qb.push(" AND g.price <= ").push_bind(max_price);
        }
        if !filter.genre.is_empty() {
            qb.push(
                " AND EXISTS (SELECT 1 FROM storefront.game_genre l \
                 WHERE l.game_id = g.id AND l.genre_id = ANY(",
            )
            .push_bind(filter.genre.clone())
            .push("))");
        }
        if !filter.game_type.is_empty() {
            qb.push(
                " AND EXISTS (SELECT 1 FROM storefront.game_game_type l \
                 WHERE l.game_id = g.id AND l.game_type_id = ANY(",
            )
            .push_bind(filter.game_type.clone())
            .push("))");
        }
        if !filter.mechanic.is_empty() {
            qb.push(
                " AND EXISTS (SELECT 1 FROM storefront.game_mechanic l \
                 WHERE l.game_id = g.id AND l.mechanic_id = ANY(",
            )
            .push_bind(filter.mechanic.clone())
            .push("))");
        }
        if let Some(player_count) = filter.player_count {
            qb.push(" AND g.player_count_id = ").push_bind(player_count);
        }
        if let Some(age_group) = filter.age_group {
            qb.push(" AND g.age_group_id = ").push_bind(age_group);
        }
        if let Some(difficulty) = filter.difficulty {
            qb.push(" AND g.difficulty_id = ").push_bind(difficulty);
        }
        if let Some(duration) = filter.duration {
            qb.push(" AND g.duration_id = ").push_bind(duration);
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(search));
            qb.push(" AND (g.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR g.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        qb.push(filter.ordering.order_clause());

        let games = qb.build_query_as::<GameSummary>().fetch_all(self.pool).await?;

        Ok(games)
    }

    /// List every taxonomy with its values, for filter UIs.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn categories(&self) -> Result<Vec<CategoryGroup>, RepositoryError> {
        // (filter parameter, display name, lookup table)
        const TAXONOMIES: &[(&str, &str, &str)] = &[
            ("game_type", "Game type", "game_type"),
            ("player_count", "Player count", "player_count"),
            ("age_group", "Age group", "age_group"),
            ("difficulty", "Difficulty level", "difficulty_level"),
            ("genre", "Genres", "genre"),
            ("mechanic", "Mechanics", "mechanic"),
            ("duration", "Duration", "duration"),
        ];

        let mut groups = Vec::with_capacity(TAXONOMIES.len());
        for &(name, display_name, table) in TAXONOMIES {
            let values: Vec<CategoryEntry> = sqlx::query_as(&format!(
                "SELECT id, name FROM storefront.{table} ORDER BY id"
            ))
            .fetch_all(self.pool)
            .await?;

            groups.push(CategoryGroup {
                name,
                display_name,
                values,
            });
        }

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_parse() {
        assert_eq!(GameOrdering::parse("-created_at"), Some(GameOrdering::Newest));
        assert_eq!(GameOrdering::parse("created_at"), Some(GameOrdering::Oldest));
        assert_eq!(GameOrdering::parse("price"), Some(GameOrdering::PriceAsc));
        assert_eq!(GameOrdering::parse("-price"), Some(GameOrdering::PriceDesc));
        assert_eq!(GameOrdering::parse("rating"), None);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50% off_deal"), "50\\% off\\_deal");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
