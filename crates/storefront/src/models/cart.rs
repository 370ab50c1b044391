//! Cart models and totals recomputation.
//!
//! A cart is keyed by either an owning user (at most one cart per user) or an
//! anonymous session token (at most one cart per token) - never neither, and
//! never both outside the merge transition. Its `total` and `total_quantity`
//! columns are derived values, recomputed in full from the current line items
//! after every mutation; they are never patched incrementally.

use chrono::{DateTime, Utc};
use serde::Serialize;

use meeplemart_core::{CartId, CartItemId, GameId, Price, SessionToken, UserId};

/// A shopping cart row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Cart {
    pub id: CartId,
    /// Owning user; `None` for guest carts.
    pub user_id: Option<UserId>,
    /// Anonymous session token; `None` for user carts.
    pub session_token: Option<SessionToken>,
    /// Derived: sum of line totals.
    pub total: Price,
    /// Derived: sum of line quantities.
    pub total_quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Whether this is a guest cart (token-keyed, no owning user).
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        self.user_id.is_none()
    }
}

/// Catalog data embedded in a serialized line item.
///
/// Price is read from the catalog at serialization time, not frozen at
/// add-time: the catalog stays the source of truth.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemGame {
    pub id: GameId,
    pub title: String,
    pub price: Price,
    pub discount_price: Price,
}

/// A cart line item joined with its game's current catalog data.
///
/// At most one line item exists per (cart, game) pair; `quantity` is always
/// positive and never exceeds the game's stock at the time its mutation
/// committed.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub game: CartItemGame,
    pub quantity: i32,
    /// `game.price * quantity`.
    pub line_total: Price,
}

/// Derived cart totals.
///
/// [`CartTotals::compute`] is the pure form of the recomputation the
/// repository performs in SQL inside every mutating transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CartTotals {
    pub total: Price,
    pub total_quantity: i32,
}

impl CartTotals {
    /// An empty cart's totals: 0.00 and 0.
    pub const EMPTY: Self = Self {
        total: Price::ZERO,
        total_quantity: 0,
    };

    /// Recompute totals from the full set of current line items.
    ///
    /// Always a full fold over the children - never an increment on the
    /// previous value - so the invariant `total == sum(line totals)` cannot
    /// drift across missed update paths. Returns `None` on arithmetic
    /// overflow.
    #[must_use]
    pub fn compute(items: &[CartLineItem]) -> Option<Self> {
        let mut total = Price::ZERO;
        let mut total_quantity: i32 = 0;

        for item in items {
            let line_total = item.game.price.line_total(item.quantity)?;
            total = total.checked_add(line_total)?;
            total_quantity = total_quantity.checked_add(item.quantity)?;
        }

        Some(Self {
            total,
            total_quantity,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i32, price_cents: i64, quantity: i32) -> CartLineItem {
        let price = Price::from_cents(price_cents);
        CartLineItem {
            id: CartItemId::new(id),
            cart_id: CartId::new(1),
            game: CartItemGame {
                id: GameId::new(id),
                title: format!("Game {id}"),
                price,
                discount_price: price,
            },
            quantity,
            line_total: price.line_total(quantity).unwrap(),
        }
    }

    #[test]
    fn test_empty_cart_totals() {
        assert_eq!(CartTotals::compute(&[]).unwrap(), CartTotals::EMPTY);
    }

    #[test]
    fn test_single_item_totals() {
        // game at 100.00, qty 2 => total 200.00, quantity 2
        let totals = CartTotals::compute(&[item(1, 10000, 2)]).unwrap();
        assert_eq!(totals.total, Price::from_cents(20000));
        assert_eq!(totals.total_quantity, 2);
    }

    #[test]
    fn test_multiple_item_totals() {
        let items = vec![item(1, 10000, 2), item(2, 2550, 3), item(3, 999, 1)];
        let totals = CartTotals::compute(&items).unwrap();
        // 200.00 + 76.50 + 9.99
        assert_eq!(totals.total, Price::from_cents(28649));
        assert_eq!(totals.total_quantity, 6);
    }

    #[test]
    fn test_totals_recomputed_not_incremental() {
        // Simulate add, update, remove: totals recomputed from scratch each
        // time must stay consistent with the surviving items.
        let mut items = vec![item(1, 10000, 2)];
        let after_add = CartTotals::compute(&items).unwrap();
        assert_eq!(after_add.total, Price::from_cents(20000));

        items.push(item(2, 5000, 1));
        let after_second = CartTotals::compute(&items).unwrap();
        assert_eq!(after_second.total, Price::from_cents(25000));
        assert_eq!(after_second.total_quantity, 3);

        // quantity updated to zero means the row is gone
        items.remove(0);
        let after_remove = CartTotals::compute(&items).unwrap();
        assert_eq!(after_remove.total, Price::from_cents(5000));
        assert_eq!(after_remove.total_quantity, 1);

        items.clear();
        assert_eq!(CartTotals::compute(&items).unwrap(), CartTotals::EMPTY);
    }

    #[test]
    fn test_totals_overflow_detected() {
        let mut oversized = item(1, 1, 1);
        oversized.quantity = i32::MAX;
        let items = vec![oversized, item(2, 1, 1)];
        assert!(CartTotals::compute(&items).is_none());
    }
}
