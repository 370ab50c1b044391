//! Fixed-point money representation.
//!
//! Prices and cart totals are `rust_decimal::Decimal` values normalized to two
//! decimal places. Binary floating point is never used for money; drift across
//! repeated totals recomputation is a correctness bug, not a cosmetic one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount with two decimal places.
///
/// Wraps a [`Decimal`] normalized to scale 2 on construction. Arithmetic is
/// checked: overflow yields `None` rather than wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero, the total of an empty cart.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount, rescaling to two decimal places.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        let mut amount = amount;
        amount.rescale(2);
        Self(amount)
    }

    /// Create a price from an amount in the smallest currency unit (cents).
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Get the underlying decimal value.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// `price * quantity`, the line total of a cart or order item.
    ///
    /// Returns `None` on arithmetic overflow.
    #[must_use]
    pub fn line_total(&self, quantity: i32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self::new)
    }

    /// Checked addition, used when summing line totals.
    #[must_use]
    pub fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self::new)
    }

    /// Whether the amount is strictly negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        assert_eq!(Price::from_cents(10000).to_string(), "100.00");
        assert_eq!(Price::from_cents(5).to_string(), "0.05");
    }

    #[test]
    fn test_new_rescales() {
        let p = Price::new(Decimal::from(100));
        assert_eq!(p.to_string(), "100.00");

        let p = Price::new(Decimal::new(19995, 3)); // 19.995
        assert_eq!(p.to_string(), "20.00");
    }

    #[test]
    fn test_line_total() {
        let price = Price::from_cents(10000); // 100.00
        let total = price.line_total(2).unwrap();
        assert_eq!(total, Price::from_cents(20000));
        assert_eq!(total.to_string(), "200.00");
    }

    #[test]
    fn test_checked_add() {
        let a = Price::from_cents(150);
        let b = Price::from_cents(250);
        assert_eq!(a.checked_add(b).unwrap(), Price::from_cents(400));
    }

    #[test]
    fn test_zero_display() {
        assert_eq!(Price::ZERO.to_string(), "0");
        assert_eq!(Price::new(Decimal::ZERO).to_string(), "0.00");
    }

    #[test]
    fn test_is_negative() {
        assert!(Price::from_cents(-1).is_negative());
        assert!(!Price::ZERO.is_negative());
        assert!(!Price::from_cents(1).is_negative());
    }

    #[test]
    fn test_serde_string_repr() {
        let p = Price::from_cents(1099);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"10.99\"");
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
