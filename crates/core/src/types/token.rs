//! Anonymous cart session token.
//!
//! Guest carts are keyed by an opaque token handed to the browser on first
//! interaction. The token is minted by the storefront (not by this crate) and
//! survives until the cart is cleared or merged into a user cart on login.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`SessionToken`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum SessionTokenError {
    /// The input string is empty.
    #[error("session token cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("session token must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains whitespace or control characters.
    #[error("session token contains invalid characters")]
    InvalidCharacters,
}

/// An opaque session token identifying a guest cart.
///
/// ## Constraints
///
/// - Length: 1-244 characters
/// - No whitespace or control characters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Maximum length of a session token.
    pub const MAX_LENGTH: usize = 244;

    /// Parse a `SessionToken` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 244 characters, or
    /// contains whitespace or control characters.
    pub fn parse(s: &str) -> Result<Self, SessionTokenError> {
        if s.is_empty() {
            return Err(SessionTokenError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SessionTokenError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(SessionTokenError::InvalidCharacters);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `SessionToken` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionToken {
    type Err = SessionTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for SessionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for SessionToken {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for SessionToken {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for SessionToken {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(SessionToken::parse("Zx9_k-3f").is_ok());
        assert!(SessionToken::parse(&"a".repeat(244)).is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            SessionToken::parse(""),
            Err(SessionTokenError::Empty)
        ));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            SessionToken::parse(&"a".repeat(245)),
            Err(SessionTokenError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_whitespace() {
        assert!(matches!(
            SessionToken::parse("abc def"),
            Err(SessionTokenError::InvalidCharacters)
        ));
        assert!(matches!(
            SessionToken::parse("abc\n"),
            Err(SessionTokenError::InvalidCharacters)
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let token = SessionToken::parse("guest-token-1").unwrap();
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"guest-token-1\"");
        let back: SessionToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }
}
