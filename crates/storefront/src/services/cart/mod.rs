//! Cart service.
//!
//! Owns the semantics of every cart operation: quantity validation, stock
//! bounds, duplicate detection, identity resolution, and the guest-cart merge.
//! Each mutation runs as one transaction - row change, totals recompute, cart
//! save - with the affected cart rows locked, so a half-applied state (item
//! changed but totals stale) is never observable. Persistence is an injected
//! pool, not something models do to themselves.

pub mod error;
pub mod identity;
pub mod merge;

pub use error::CartError;
pub use identity::{CartIdentity, mint_token};

use sqlx::{PgConnection, PgPool};

use meeplemart_core::{CartItemId, GameId, SessionToken, UserId};

use crate::db::RepositoryError;
use crate::db::carts;
use crate::models::cart::{Cart, CartLineItem};

/// Cart domain service.
pub struct CartService<'a> {
    pool: &'a PgPool,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Identity resolution
    // =========================================================================

    /// Find the cart belonging to an identity, if any. Never creates.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn find_cart(&self, identity: &CartIdentity) -> Result<Option<Cart>, CartError> {
        let cart = match identity {
            CartIdentity::User(user_id) => carts::find_by_user(self.pool, *user_id).await?,
            CartIdentity::Guest(token) => carts::find_by_token(self.pool, token).await?,
        };
        Ok(cart)
    }

    /// Resolve the identity's cart, creating one if absent. **Mutating.**
    ///
    /// A concurrent create is absorbed by retrying the lookup once; only if
    /// that also misses does this fail with [`CartError::IdentityConflict`].
    ///
    /// # Errors
    ///
    /// Returns `CartError::IdentityConflict` on a double-lost uniqueness race,
    /// `CartError::Repository` on query failure.
    pub async fn resolve_or_create(&self, identity: &CartIdentity) -> Result<Cart, CartError> {
        let mut conn = self.pool.acquire().await.map_err(RepositoryError::from)?;
        find_or_create_on(&mut conn, identity).await
    }

    // =========================================================================
    // Line items
    // =========================================================================

    /// List the identity's cart items. An identity without a cart has none.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn list_items(&self, identity: &CartIdentity) -> Result<Vec<CartLineItem>, CartError> {
        match self.find_cart(identity).await? {
            Some(cart) => Ok(carts::list_items(self.pool, cart.id).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Add a game to the identity's cart, creating the cart if needed.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`] if `quantity <= 0`
    /// - [`CartError::GameNotFound`] if the game does not exist
    /// - [`CartError::StockExceeded`] if `quantity` exceeds current stock
    /// - [`CartError::DuplicateItem`] if the cart already holds this game;
    ///   callers update the existing line item instead
    pub async fn add_item(
        &self,
        identity: &CartIdentity,
        game_id: GameId,
        quantity: i32,
    ) -> Result<CartLineItem, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        // Validate against the catalog before touching cart rows, so a failed
        // add never lazily creates a cart.
        let pricing = carts::game_pricing(&mut *tx, game_id)
            .await?
            .ok_or(CartError::GameNotFound)?;
        if quantity > pricing.stock {
            return Err(CartError::StockExceeded {
                available: pricing.stock,
            });
        }

        let cart = find_or_create_on(&mut tx, identity).await?;
        carts::lock_cart(&mut tx, cart.id).await?;

        let item_id = carts::insert_item(&mut *tx, cart.id, game_id, quantity)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => CartError::DuplicateItem { game_id },
                other => CartError::Repository(other),
            })?;

        carts::recompute_totals(&mut tx, cart.id).await?;

        let item = carts::get_item_view(&mut *tx, item_id)
            .await?
            .ok_or(CartError::Repository(RepositoryError::NotFound))?;

        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(item)
    }

    /// Set a line item's quantity; zero removes it.
    ///
    /// Stock is re-read at update time - the bound is the catalog's current
    /// stock, not whatever it was when the item was added.
    ///
    /// Returns the updated item, or `None` if `quantity == 0` deleted it.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`] if `quantity < 0`
    /// - [`CartError::ItemNotFound`] if the item does not exist or belongs to
    ///   another identity's cart
    /// - [`CartError::StockExceeded`] if `quantity` exceeds current stock
    pub async fn update_item(
        &self,
        identity: &CartIdentity,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<Option<CartLineItem>, CartError> {
        if quantity < 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let item = carts::find_item_locked(&mut tx, item_id)
            .await?
            .filter(|item| identity.owns_cart(item.user_id, item.session_token.as_ref()))
            .ok_or(CartError::ItemNotFound)?;

        if quantity == 0 {
            carts::delete_item(&mut *tx, item.id).await?;
            carts::recompute_totals(&mut tx, item.cart_id).await?;
            tx.commit().await.map_err(RepositoryError::from)?;
            return Ok(None);
        }

        let pricing = carts::game_pricing(&mut *tx, item.game_id)
            .await?
            .ok_or(CartError::GameNotFound)?;
        if quantity > pricing.stock {
            return Err(CartError::StockExceeded {
                available: pricing.stock,
            });
        }

        carts::update_item_quantity(&mut *tx, item.id, quantity).await?;
        carts::recompute_totals(&mut tx, item.cart_id).await?;

        let updated = carts::get_item_view(&mut *tx, item.id)
            .await?
            .ok_or(CartError::Repository(RepositoryError::NotFound))?;

        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(Some(updated))
    }

    /// Remove a line item from the identity's cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the item does not exist or
    /// belongs to another identity's cart.
    pub async fn remove_item(
        &self,
        identity: &CartIdentity,
        item_id: CartItemId,
    ) -> Result<(), CartError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let item = carts::find_item_locked(&mut tx, item_id)
            .await?
            .filter(|item| identity.owns_cart(item.user_id, item.session_token.as_ref()))
            .ok_or(CartError::ItemNotFound)?;

        carts::delete_item(&mut *tx, item.id).await?;
        carts::recompute_totals(&mut tx, item.cart_id).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(())
    }

    /// Delete the identity's whole cart, line items included.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NoCart`] if the identity has no cart.
    pub async fn clear(&self, identity: &CartIdentity) -> Result<(), CartError> {
        let cart = self
            .find_cart(identity)
            .await?
            .ok_or(CartError::NoCart)?;

        carts::delete_cart(self.pool, cart.id).await?;

        Ok(())
    }

    // =========================================================================
    // Merge
    // =========================================================================

    /// Fold the guest cart identified by `old_token` into the user's cart.
    ///
    /// One transaction: both carts are locked in id order, overlapping items
    /// are combined with quantity capped at current stock (excess dropped
    /// silently), disjoint guest items are re-parented, the guest cart is
    /// deleted, and the user cart's totals are recomputed. Any failure rolls
    /// the whole thing back.
    ///
    /// Not idempotent by design: once merged, the token resolves to nothing
    /// and a second call fails with [`CartError::GuestCartNotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`CartError::GuestCartNotFound`] if no guest cart exists for
    /// the token (expired, already merged, or never created).
    pub async fn merge(
        &self,
        user_id: UserId,
        old_token: &SessionToken,
    ) -> Result<Cart, CartError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let guest = carts::find_guest_by_token(&mut *tx, old_token)
            .await?
            .ok_or(CartError::GuestCartNotFound)?;

        let user_identity = CartIdentity::User(user_id);
        let user_cart = find_or_create_on(&mut tx, &user_identity).await?;

        carts::lock_cart_pair(&mut tx, guest.id, user_cart.id).await?;

        // The guest cart may have been merged or cleared while we waited on
        // the locks; re-read it under the lock before touching anything.
        let guest = carts::find_guest_by_token(&mut *tx, old_token)
            .await?
            .ok_or(CartError::GuestCartNotFound)?;

        let user_items = carts::merge_items(&mut *tx, user_cart.id).await?;
        let guest_items = carts::merge_items(&mut *tx, guest.id).await?;
        let plan = merge::plan_merge(&user_items, &guest_items);

        for (item_id, quantity) in plan.updates {
            carts::update_item_quantity(&mut *tx, item_id, quantity).await?;
        }
        for item_id in plan.transfers {
            carts::reparent_item(&mut *tx, item_id, user_cart.id).await?;
        }

        carts::delete_cart(&mut *tx, guest.id).await?;
        carts::recompute_totals(&mut tx, user_cart.id).await?;

        let merged = carts::find_by_user(&mut *tx, user_id)
            .await?
            .ok_or(CartError::Repository(RepositoryError::NotFound))?;

        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(merged)
    }
}

/// Find-or-create a cart on an open connection.
///
/// The insert uses `ON CONFLICT DO NOTHING`, so losing a creation race inside
/// a transaction does not abort it; the race is absorbed by retrying the
/// lookup exactly once.
async fn find_or_create_on(
    conn: &mut PgConnection,
    identity: &CartIdentity,
) -> Result<Cart, CartError> {
    if let Some(cart) = find_on(&mut *conn, identity).await? {
        return Ok(cart);
    }

    let created = match identity {
        CartIdentity::User(user_id) => carts::create_for_user(&mut *conn, *user_id).await?,
        CartIdentity::Guest(token) => carts::create_for_token(&mut *conn, token).await?,
    };
    if let Some(cart) = created {
        return Ok(cart);
    }

    // A concurrent request created the cart between lookup and insert.
    find_on(conn, identity)
        .await?
        .ok_or(CartError::IdentityConflict)
}

async fn find_on(
    conn: &mut PgConnection,
    identity: &CartIdentity,
) -> Result<Option<Cart>, RepositoryError> {
    match identity {
        CartIdentity::User(user_id) => carts::find_by_user(&mut *conn, *user_id).await,
        CartIdentity::Guest(token) => carts::find_by_token(&mut *conn, token).await,
    }
}
