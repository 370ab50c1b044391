//! Cart route handlers.
//!
//! Thin JSON wrappers over [`CartService`]: each handler builds an explicit
//! [`CartIdentity`] from the request (authenticated user or anonymous cart
//! token) and delegates. The only state a handler touches itself is the
//! session-stored cart token - minted here, before resolution, never inside a
//! lookup.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use meeplemart_core::{CartItemId, GameId, SessionToken};

use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::cart::CartLineItem;
use crate::models::{CurrentUser, session_keys};
use crate::services::cart::{CartIdentity, CartService, mint_token};
use crate::state::AppState;

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub game_id: GameId,
    pub quantity: i32,
}

/// Update cart item request body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

/// Merge request body. The field is validated by hand so a missing token is a
/// 400 with a useful message, not a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub old_session_id: Option<String>,
}

/// Read the anonymous cart token from the session, if one was minted.
async fn stored_token(session: &Session) -> Option<SessionToken> {
    session
        .get::<String>(session_keys::CART_TOKEN)
        .await
        .ok()
        .flatten()
        .and_then(|raw| SessionToken::parse(&raw).ok())
}

/// Identity for read paths: never mints a token. A guest who has not touched
/// a cart yet simply has no identity (and therefore no cart).
async fn identity(session: &Session, user: Option<&CurrentUser>) -> Option<CartIdentity> {
    if let Some(user) = user {
        return Some(CartIdentity::User(user.id));
    }
    stored_token(session).await.map(CartIdentity::Guest)
}

/// Identity for mutation paths: mints and stores a fresh cart token for
/// guests on their first add-to-cart. Explicitly mutating.
async fn identity_or_mint(
    session: &Session,
    user: Option<&CurrentUser>,
) -> Result<CartIdentity> {
    if let Some(identity) = identity(session, user).await {
        return Ok(identity);
    }

    let token = mint_token();
    session
        .insert(session_keys::CART_TOKEN, token.as_str())
        .await
        .map_err(|e| AppError::Internal(format!("failed to store cart token: {e}")))?;

    Ok(CartIdentity::Guest(token))
}

/// List own cart items.
#[instrument(skip_all)]
pub async fn list_items(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<Vec<CartLineItem>>> {
    let Some(identity) = identity(&session, user.as_ref()).await else {
        return Ok(Json(Vec::new()));
    };

    let items = CartService::new(state.pool()).list_items(&identity).await?;
    Ok(Json(items))
}

/// Add an item to the cart, creating the cart lazily.
#[instrument(skip_all, fields(game_id = %request.game_id, quantity = request.quantity))]
pub async fn add_item(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(request): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartLineItem>)> {
    let identity = identity_or_mint(&session, user.as_ref()).await?;

    let item = CartService::new(state.pool())
        .add_item(&identity, request.game_id, request.quantity)
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Update a line item's quantity. Quantity 0 deletes the item (204).
#[instrument(skip_all, fields(item_id = id, quantity = request.quantity))]
pub async fn update_item(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<i32>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Response> {
    let identity = identity(&session, user.as_ref())
        .await
        .ok_or(AppError::NotFound("cart item not found".to_string()))?;

    let updated = CartService::new(state.pool())
        .update_item(&identity, CartItemId::new(id), request.quantity)
        .await?;

    Ok(match updated {
        Some(item) => Json(item).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Remove a line item.
#[instrument(skip_all, fields(item_id = id))]
pub async fn remove_item(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let identity = identity(&session, user.as_ref())
        .await
        .ok_or(AppError::NotFound("cart item not found".to_string()))?;

    CartService::new(state.pool())
        .remove_item(&identity, CartItemId::new(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete the whole cart.
#[instrument(skip_all)]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<StatusCode> {
    let identity = identity(&session, user.as_ref())
        .await
        .ok_or(AppError::BadRequest(
            "this user does not have a cart".to_string(),
        ))?;

    CartService::new(state.pool()).clear(&identity).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Merge the guest cart identified by `old_session_id` into the logged-in
/// user's cart.
#[instrument(skip_all)]
pub async fn merge(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(request): Json<MergeRequest>,
) -> Result<Json<serde_json::Value>> {
    let raw = request
        .old_session_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(AppError::BadRequest("old_session_id is required".to_string()))?;

    let old_token = SessionToken::parse(raw)
        .map_err(|e| AppError::BadRequest(format!("invalid old_session_id: {e}")))?;

    CartService::new(state.pool()).merge(user.id, &old_token).await?;

    // The merged token is exhausted; drop it from this session if it was ours.
    if stored_token(&session).await.as_ref() == Some(&old_token)
        && let Err(e) = session
            .remove::<String>(session_keys::CART_TOKEN)
            .await
    {
        tracing::warn!("failed to clear merged cart token from session: {e}");
    }

    Ok(Json(json!({ "detail": "merged" })))
}
