//! Merge planning: folding a guest cart into a user cart.
//!
//! The planner is pure. Given both carts' items (with each game's current
//! stock), it decides, per guest item:
//!
//! - game already in the user cart: set the user item's quantity to
//!   `min(user + guest, stock)`. Merge never creates backorder; guest quantity
//!   beyond remaining stock is dropped silently, as a best-effort
//!   reconciliation rather than a user-facing validation failure.
//! - otherwise: re-parent the guest item onto the user cart (ownership
//!   transfer, not a delete/insert pair).
//!
//! The plan is commutative per game id - guest item order never matters.
//! Executing it (locking, SQL, guest-cart deletion, totals recompute) is the
//! cart service's job.

use std::collections::HashMap;

use meeplemart_core::{CartItemId, GameId};

/// A cart item with its game's current stock, as loaded for merge planning.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct MergeItem {
    pub id: CartItemId,
    pub game_id: GameId,
    pub quantity: i32,
    pub stock: i32,
}

/// The actions a merge will apply, in either order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MergePlan {
    /// User-cart items whose quantity changes: `(user item id, new quantity)`.
    pub updates: Vec<(CartItemId, i32)>,
    /// Guest-cart items to re-parent onto the user cart.
    pub transfers: Vec<CartItemId>,
}

/// Combined quantity for a game in both carts, capped at its stock.
fn capped_quantity(user: i32, guest: i32, stock: i32) -> i32 {
    let combined = i64::from(user) + i64::from(guest);
    i32::try_from(combined.min(i64::from(stock))).unwrap_or(stock)
}

/// Build the merge plan for folding `guest_items` into the cart holding
/// `user_items`.
#[must_use]
pub fn plan_merge(user_items: &[MergeItem], guest_items: &[MergeItem]) -> MergePlan {
    let by_game: HashMap<GameId, &MergeItem> =
        user_items.iter().map(|item| (item.game_id, item)).collect();

    let mut plan = MergePlan::default();
    for guest_item in guest_items {
        match by_game.get(&guest_item.game_id) {
            Some(user_item) => {
                let quantity =
                    capped_quantity(user_item.quantity, guest_item.quantity, user_item.stock);
                plan.updates.push((user_item.id, quantity));
            }
            None => plan.transfers.push(guest_item.id),
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i32, game_id: i32, quantity: i32, stock: i32) -> MergeItem {
        MergeItem {
            id: CartItemId::new(id),
            game_id: GameId::new(game_id),
            quantity,
            stock,
        }
    }

    #[test]
    fn test_overlapping_quantities_sum_within_stock() {
        // guest has game A qty 3 (stock 5); user has game A qty 2
        // => user item updated to 5, nothing transferred
        let user = vec![item(1, 100, 2, 5)];
        let guest = vec![item(2, 100, 3, 5)];

        let plan = plan_merge(&user, &guest);
        assert_eq!(plan.updates, vec![(CartItemId::new(1), 5)]);
        assert!(plan.transfers.is_empty());
    }

    #[test]
    fn test_excess_over_stock_silently_dropped() {
        // guest has game B qty 4 (stock 10); user already holds 10
        // => quantity stays 10, no error
        let user = vec![item(1, 200, 10, 10)];
        let guest = vec![item(2, 200, 4, 10)];

        let plan = plan_merge(&user, &guest);
        assert_eq!(plan.updates, vec![(CartItemId::new(1), 10)]);
        assert!(plan.transfers.is_empty());
    }

    #[test]
    fn test_disjoint_items_are_transferred() {
        let user = vec![item(1, 100, 2, 5)];
        let guest = vec![item(2, 200, 1, 9), item(3, 300, 4, 4)];

        let plan = plan_merge(&user, &guest);
        assert!(plan.updates.is_empty());
        assert_eq!(
            plan.transfers,
            vec![CartItemId::new(2), CartItemId::new(3)]
        );
    }

    #[test]
    fn test_mixed_overlap_and_transfer() {
        let user = vec![item(1, 100, 1, 3), item(2, 200, 5, 8)];
        let guest = vec![item(3, 100, 4, 3), item(4, 300, 2, 6)];

        let plan = plan_merge(&user, &guest);
        // game 100: 1 + 4 capped at 3
        assert_eq!(plan.updates, vec![(CartItemId::new(1), 3)]);
        assert_eq!(plan.transfers, vec![CartItemId::new(4)]);
    }

    #[test]
    fn test_empty_guest_cart_plans_nothing() {
        let user = vec![item(1, 100, 2, 5)];
        let plan = plan_merge(&user, &[]);
        assert_eq!(plan, MergePlan::default());
    }

    #[test]
    fn test_commutative_per_game() {
        let user = vec![item(1, 100, 2, 9), item(2, 200, 1, 4)];
        let guest_a = vec![item(3, 100, 3, 9), item(4, 400, 2, 2)];
        let mut guest_b = guest_a.clone();
        guest_b.reverse();

        let mut plan_a = plan_merge(&user, &guest_a);
        let mut plan_b = plan_merge(&user, &guest_b);
        plan_a.updates.sort_unstable();
        plan_b.updates.sort_unstable();
        plan_a.transfers.sort_unstable();
        plan_b.transfers.sort_unstable();
        assert_eq!(plan_a, plan_b);
    }

    #[test]
    fn test_capped_quantity_never_exceeds_stock() {
        assert_eq!(capped_quantity(2, 3, 5), 5);
        assert_eq!(capped_quantity(10, 4, 10), 10);
        assert_eq!(capped_quantity(1, 1, 5), 2);
        // even near i32::MAX the combined quantity cannot overflow
        assert_eq!(capped_quantity(i32::MAX, i32::MAX, 7), 7);
    }
}
