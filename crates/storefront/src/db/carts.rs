//! Cart SQL operations.
//!
//! Unlike the other repositories, these are executor-generic free functions:
//! every cart mutation is "row change + totals recompute + cart save" inside a
//! single transaction owned by the cart service, and the merge transaction
//! spans two carts. Each function is one SQL statement; the service composes
//! them.

use sqlx::PgConnection;
use sqlx::postgres::PgExecutor;

use meeplemart_core::{CartId, CartItemId, GameId, SessionToken, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::cart::{Cart, CartItemGame, CartLineItem, CartTotals};
use crate::models::game::GamePricing;
use crate::services::cart::merge::MergeItem;

const CART_COLUMNS: &str = "id, user_id, session_token, total, total_quantity, created_at";

/// Line-item view row: the item joined with its game's current catalog data.
#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: CartItemId,
    cart_id: CartId,
    quantity: i32,
    game_id: GameId,
    title: String,
    price: meeplemart_core::Price,
    discount_price: meeplemart_core::Price,
    line_total: meeplemart_core::Price,
}

impl From<CartItemRow> for CartLineItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: row.id,
            cart_id: row.cart_id,
            game: CartItemGame {
                id: row.game_id,
                title: row.title,
                price: row.price,
                discount_price: row.discount_price,
            },
            quantity: row.quantity,
            line_total: row.line_total,
        }
    }
}

const ITEM_VIEW_SQL: &str = r"
    SELECT ci.id, ci.cart_id, ci.quantity,
           g.id AS game_id, g.title, g.price, g.discount_price,
           (g.price * ci.quantity)::numeric(10,2) AS line_total
    FROM storefront.cart_item ci
    JOIN storefront.game g ON g.id = ci.game_id
";

/// Find a cart by its owning user.
pub async fn find_by_user<'e>(
    executor: impl PgExecutor<'e>,
    user_id: UserId,
) -> Result<Option<Cart>, RepositoryError> {
    let cart = sqlx::query_as(&format!(
        "SELECT {CART_COLUMNS} FROM storefront.cart WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(cart)
}

/// Find a cart by its anonymous session token.
pub async fn find_by_token<'e>(
    executor: impl PgExecutor<'e>,
    token: &SessionToken,
) -> Result<Option<Cart>, RepositoryError> {
    let cart = sqlx::query_as(&format!(
        "SELECT {CART_COLUMNS} FROM storefront.cart WHERE session_token = $1"
    ))
    .bind(token.as_str())
    .fetch_optional(executor)
    .await?;

    Ok(cart)
}

/// Find a guest cart: keyed by token with no owning user.
///
/// A cart that has already been merged (or was created for a user) does not
/// match, so a second merge of the same token reports not-found.
pub async fn find_guest_by_token<'e>(
    executor: impl PgExecutor<'e>,
    token: &SessionToken,
) -> Result<Option<Cart>, RepositoryError> {
    let cart = sqlx::query_as(&format!(
        "SELECT {CART_COLUMNS} FROM storefront.cart \
         WHERE session_token = $1 AND user_id IS NULL"
    ))
    .bind(token.as_str())
    .fetch_optional(executor)
    .await?;

    Ok(cart)
}

/// Insert a cart owned by a user, unless one already exists.
///
/// `ON CONFLICT DO NOTHING` keeps a lost creation race from aborting the
/// surrounding transaction; `None` means another request won it.
pub async fn create_for_user<'e>(
    executor: impl PgExecutor<'e>,
    user_id: UserId,
) -> Result<Option<Cart>, RepositoryError> {
    let cart = sqlx::query_as(&format!(
        "INSERT INTO storefront.cart (user_id) VALUES ($1) \
         ON CONFLICT (user_id) DO NOTHING RETURNING {CART_COLUMNS}"
    ))
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(cart)
}

/// Insert a cart keyed by an anonymous session token, unless one already
/// exists. `None` means another request won the creation race.
pub async fn create_for_token<'e>(
    executor: impl PgExecutor<'e>,
    token: &SessionToken,
) -> Result<Option<Cart>, RepositoryError> {
    let cart = sqlx::query_as(&format!(
        "INSERT INTO storefront.cart (session_token) VALUES ($1) \
         ON CONFLICT (session_token) DO NOTHING RETURNING {CART_COLUMNS}"
    ))
    .bind(token.as_str())
    .fetch_optional(executor)
    .await?;

    Ok(cart)
}

/// Lock a cart row for the duration of the transaction.
///
/// Serializes concurrent mutations of the same cart (two tabs updating
/// quantities) on the storage layer's row lock.
pub async fn lock_cart(conn: &mut PgConnection, cart_id: CartId) -> Result<(), RepositoryError> {
    sqlx::query("SELECT id FROM storefront.cart WHERE id = $1 FOR UPDATE")
        .bind(cart_id)
        .fetch_optional(conn)
        .await?;

    Ok(())
}

/// Lock two cart rows in id order.
///
/// The merge transaction spans the guest and user carts; a consistent lock
/// order prevents deadlock against a concurrent merge or mutation.
pub async fn lock_cart_pair(
    conn: &mut PgConnection,
    first: CartId,
    second: CartId,
) -> Result<(), RepositoryError> {
    sqlx::query("SELECT id FROM storefront.cart WHERE id = ANY($1) ORDER BY id FOR UPDATE")
        .bind(vec![first.as_i32(), second.as_i32()])
        .fetch_all(conn)
        .await?;

    Ok(())
}

/// Read a game's current price and stock.
pub async fn game_pricing<'e>(
    executor: impl PgExecutor<'e>,
    game_id: GameId,
) -> Result<Option<GamePricing>, RepositoryError> {
    let pricing = sqlx::query_as("SELECT price, stock FROM storefront.game WHERE id = $1")
        .bind(game_id)
        .fetch_optional(executor)
        .await?;

    Ok(pricing)
}

/// List a cart's line items with current catalog data, oldest first.
pub async fn list_items<'e>(
    executor: impl PgExecutor<'e>,
    cart_id: CartId,
) -> Result<Vec<CartLineItem>, RepositoryError> {
    let rows: Vec<CartItemRow> =
        sqlx::query_as(&format!("{ITEM_VIEW_SQL} WHERE ci.cart_id = $1 ORDER BY ci.id"))
            .bind(cart_id)
            .fetch_all(executor)
            .await?;

    Ok(rows.into_iter().map(CartLineItem::from).collect())
}

/// Get a single line-item view by id.
pub async fn get_item_view<'e>(
    executor: impl PgExecutor<'e>,
    item_id: CartItemId,
) -> Result<Option<CartLineItem>, RepositoryError> {
    let row: Option<CartItemRow> =
        sqlx::query_as(&format!("{ITEM_VIEW_SQL} WHERE ci.id = $1"))
            .bind(item_id)
            .fetch_optional(executor)
            .await?;

    Ok(row.map(CartLineItem::from))
}

/// A line item with its owning cart's identity columns, for ownership checks.
#[derive(sqlx::FromRow)]
pub struct OwnedItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub game_id: GameId,
    pub quantity: i32,
    pub user_id: Option<UserId>,
    pub session_token: Option<SessionToken>,
}

/// Find a line item and lock both it and its cart.
pub async fn find_item_locked(
    conn: &mut PgConnection,
    item_id: CartItemId,
) -> Result<Option<OwnedItem>, RepositoryError> {
    let item = sqlx::query_as(
        r"
        SELECT ci.id, ci.cart_id, ci.game_id, ci.quantity, c.user_id, c.session_token
        FROM storefront.cart_item ci
        JOIN storefront.cart c ON c.id = ci.cart_id
        WHERE ci.id = $1
        FOR UPDATE OF ci, c
        ",
    )
    .bind(item_id)
    .fetch_optional(conn)
    .await?;

    Ok(item)
}

/// Insert a line item.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the cart already holds a line item
/// for the game (the `(cart_id, game_id)` unique constraint).
pub async fn insert_item<'e>(
    executor: impl PgExecutor<'e>,
    cart_id: CartId,
    game_id: GameId,
    quantity: i32,
) -> Result<CartItemId, RepositoryError> {
    let (id,): (CartItemId,) = sqlx::query_as(
        "INSERT INTO storefront.cart_item (cart_id, game_id, quantity) \
         VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(cart_id)
    .bind(game_id)
    .bind(quantity)
    .fetch_one(executor)
    .await
    .map_err(|e| map_unique_violation(e, "line item for game already in cart"))?;

    Ok(id)
}

/// Set a line item's quantity.
pub async fn update_item_quantity<'e>(
    executor: impl PgExecutor<'e>,
    item_id: CartItemId,
    quantity: i32,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("UPDATE storefront.cart_item SET quantity = $1 WHERE id = $2")
        .bind(quantity)
        .bind(item_id)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

/// Move a line item onto another cart (ownership transfer during merge).
pub async fn reparent_item<'e>(
    executor: impl PgExecutor<'e>,
    item_id: CartItemId,
    new_cart_id: CartId,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("UPDATE storefront.cart_item SET cart_id = $1 WHERE id = $2")
        .bind(new_cart_id)
        .bind(item_id)
        .execute(executor)
        .await
        .map_err(|e| map_unique_violation(e, "line item for game already in cart"))?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

/// Delete a line item.
pub async fn delete_item<'e>(
    executor: impl PgExecutor<'e>,
    item_id: CartItemId,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM storefront.cart_item WHERE id = $1")
        .bind(item_id)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

/// Delete a cart; its line items cascade.
pub async fn delete_cart<'e>(
    executor: impl PgExecutor<'e>,
    cart_id: CartId,
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM storefront.cart WHERE id = $1")
        .bind(cart_id)
        .execute(executor)
        .await?;

    Ok(())
}

/// Recompute and persist a cart's derived totals from its current line items.
///
/// Always a full aggregate over the child rows, never an increment, so the
/// totals invariant holds regardless of which mutation path ran.
pub async fn recompute_totals(
    conn: &mut PgConnection,
    cart_id: CartId,
) -> Result<CartTotals, RepositoryError> {
    let totals: CartTotals = sqlx::query_as(
        r"
        UPDATE storefront.cart c
        SET total = COALESCE((SELECT SUM((g.price * ci.quantity)::numeric(10,2))
                              FROM storefront.cart_item ci
                              JOIN storefront.game g ON g.id = ci.game_id
                              WHERE ci.cart_id = c.id), 0),
            total_quantity = COALESCE((SELECT SUM(ci.quantity)::int
                                       FROM storefront.cart_item ci
                                       WHERE ci.cart_id = c.id), 0)
        WHERE c.id = $1
        RETURNING c.total, c.total_quantity
        ",
    )
    .bind(cart_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(totals)
}

/// Load a cart's items with each game's current stock, for merge planning.
pub async fn merge_items<'e>(
    executor: impl PgExecutor<'e>,
    cart_id: CartId,
) -> Result<Vec<MergeItem>, RepositoryError> {
    let items = sqlx::query_as(
        r"
        SELECT ci.id, ci.game_id, ci.quantity, g.stock
        FROM storefront.cart_item ci
        JOIN storefront.game g ON g.id = ci.game_id
        WHERE ci.cart_id = $1
        ORDER BY ci.id
        ",
    )
    .bind(cart_id)
    .fetch_all(executor)
    .await?;

    Ok(items)
}
