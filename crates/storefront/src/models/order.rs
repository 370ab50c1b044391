//! Order and shipment models.
//!
//! Orders freeze prices at placement time (unlike cart line items, which read
//! the catalog's current price). Only the data model lives here; order
//! placement is not part of the cart core.

use chrono::{DateTime, Utc};
use serde::Serialize;

use meeplemart_core::{GameId, OrderId, OrderItemId, OrderStatus, Price, ShipmentId, UserId};

/// A placed order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// One line of a placed order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub game_id: GameId,
    pub quantity: i32,
    /// Unit price captured when the order was placed.
    pub price: Price,
}

/// A shipping address attached to a user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Shipment {
    pub id: ShipmentId,
    pub user_id: UserId,
    pub state: String,
    pub city: String,
    pub address: String,
    pub zipcode: String,
}

/// Validate a US ZIP code: `NNNNN` or `NNNNN-NNNN`.
#[must_use]
pub fn is_valid_zipcode(value: &str) -> bool {
    let bytes = value.as_bytes();
    match bytes.len() {
        5 => bytes.iter().all(u8::is_ascii_digit),
        10 => {
            bytes.iter().take(5).all(u8::is_ascii_digit)
                && bytes.get(5) == Some(&b'-')
                && bytes.iter().skip(6).all(u8::is_ascii_digit)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_zipcodes() {
        assert!(is_valid_zipcode("12345"));
        assert!(is_valid_zipcode("12345-6789"));
    }

    #[test]
    fn test_invalid_zipcodes() {
        assert!(!is_valid_zipcode(""));
        assert!(!is_valid_zipcode("1234"));
        assert!(!is_valid_zipcode("123456"));
        assert!(!is_valid_zipcode("12345-678"));
        assert!(!is_valid_zipcode("12345 6789"));
        assert!(!is_valid_zipcode("abcde"));
        assert!(!is_valid_zipcode("12345-abcd"));
    }
}
