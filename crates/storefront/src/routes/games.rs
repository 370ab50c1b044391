//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use meeplemart_core::GameId;

use crate::db::GameRepository;
use crate::db::games::{GameListFilter, GameOrdering};
use crate::error::{AppError, Result};
use crate::models::game::{CategoryGroup, Game, GameSummary};
use crate::state::AppState;

/// Query parameters for the game list endpoint.
///
/// Taxonomy filters take comma-separated id lists (`?genre=1,3`), matching
/// the ids served by `GET /games/categories`.
#[derive(Debug, Default, Deserialize)]
pub struct GameListQuery {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub genre: Option<String>,
    #[serde(rename = "type")]
    pub game_type: Option<String>,
    pub mechanic: Option<String>,
    pub player_count: Option<i32>,
    pub age_group: Option<i32>,
    pub difficulty: Option<i32>,
    pub duration: Option<i32>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

/// Parse a comma-separated id list filter value.
fn parse_id_list(name: &str, value: Option<&str>) -> Result<Vec<i32>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(Vec::new());
    };

    value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<i32>()
                .map_err(|_| AppError::BadRequest(format!("{name} must be a list of ids")))
        })
        .collect()
}

impl GameListQuery {
    fn into_filter(self) -> Result<GameListFilter> {
        if let Some(min_price) = self.min_price
            && min_price < Decimal::ZERO
        {
            return Err(AppError::BadRequest(
                "min_price cannot be negative".to_string(),
            ));
        }
        if let Some(max_price) = self.max_price
            && max_price < Decimal::ZERO
        {
            return Err(AppError::BadRequest(
                "max_price cannot be negative".to_string(),
            ));
        }
        if let (Some(min_price), Some(max_price)) = (self.min_price, self.max_price)
            && min_price > max_price
        {
            return Err(AppError::BadRequest(
                "min_price cannot be greater than max_price".to_string(),
            ));
        }

        Ok(GameListFilter {
            min_price: self.min_price,
            max_price: self.max_price,
            genre: parse_id_list("genre", self.genre.as_deref())?,
            game_type: parse_id_list("type", self.game_type.as_deref())?,
            mechanic: parse_id_list("mechanic", self.mechanic.as_deref())?,
            player_count: self.player_count,
            age_group: self.age_group,
            difficulty: self.difficulty,
            duration: self.duration,
            search: self.search,
            // Unknown ordering values fall back to the default, newest first
            ordering: self
                .ordering
                .as_deref()
                .and_then(GameOrdering::parse)
                .unwrap_or_default(),
        })
    }
}

/// List games, filtered and ordered.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<GameListQuery>,
) -> Result<Json<Vec<GameSummary>>> {
    let filter = query.into_filter()?;
    let games = GameRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(games))
}

/// Game detail.
#[instrument(skip_all, fields(game_id = id))]
pub async fn show(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<Game>> {
    let game = GameRepository::new(state.pool())
        .get(GameId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("game {id} not found")))?;

    Ok(Json(game))
}

/// All taxonomies with their values, for building filter UIs.
#[instrument(skip_all)]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryGroup>>> {
    let groups = GameRepository::new(state.pool()).categories().await?;
    Ok(Json(groups))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("genre", None).unwrap(), Vec::<i32>::new());
        assert_eq!(parse_id_list("genre", Some("")).unwrap(), Vec::<i32>::new());
        assert_eq!(parse_id_list("genre", Some("1,3, 5")).unwrap(), vec![1, 3, 5]);
        assert!(parse_id_list("genre", Some("1,x")).is_err());
    }

    #[test]
    fn test_price_bounds_validated() {
        let query = GameListQuery {
            min_price: Some(Decimal::from(100)),
            max_price: Some(Decimal::from(50)),
            ..GameListQuery::default()
        };
        assert!(query.into_filter().is_err());

        let query = GameListQuery {
            min_price: Some(Decimal::from(-1)),
            ..GameListQuery::default()
        };
        assert!(query.into_filter().is_err());

        let query = GameListQuery {
            min_price: Some(Decimal::from(10)),
            max_price: Some(Decimal::from(50)),
            ..GameListQuery::default()
        };
        assert!(query.into_filter().is_ok());
    }
}
