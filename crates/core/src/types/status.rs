//! Status enums for orders.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed but not yet picked up by fulfillment.
    #[default]
    Pending,
    /// Being packed.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Confirmed delivered.
    Delivered,
    /// Cancelled before shipment.
    Cancelled,
}

impl OrderStatus {
    /// Whether the order can still be cancelled.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            "\"pending\""
        );
        let status: OrderStatus = serde_json::from_str("\"shipped\"").unwrap();
        assert_eq!(status, OrderStatus::Shipped);
    }

    #[test]
    fn test_is_cancellable() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Processing.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
        assert!(!OrderStatus::Delivered.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());
    }
}
