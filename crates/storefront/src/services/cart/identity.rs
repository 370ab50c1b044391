//! Cart identity.
//!
//! Every cart operation receives the caller's identity as an explicit
//! parameter - an authenticated user id or an anonymous session token - never
//! read from ambient request state. Token minting is its own named, mutating
//! step performed by the handler before resolution; lookups never mint.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

use meeplemart_core::{SessionToken, UserId};

/// The identity a cart belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartIdentity {
    /// An authenticated user (at most one cart per user).
    User(UserId),
    /// An anonymous session (at most one cart per token).
    Guest(SessionToken),
}

impl CartIdentity {
    /// Whether a cart with the given key columns belongs to this identity.
    ///
    /// Used for ownership checks on line items: a miss is reported as
    /// not-found, never as forbidden, so item ids are not probeable.
    #[must_use]
    pub fn owns_cart(&self, user_id: Option<UserId>, session_token: Option<&SessionToken>) -> bool {
        match self {
            Self::User(id) => user_id == Some(*id),
            Self::Guest(token) => session_token == Some(token),
        }
    }
}

/// Mint a fresh anonymous session token: 32 random bytes, base64url.
#[must_use]
pub fn mint_token() -> SessionToken {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    let encoded = URL_SAFE_NO_PAD.encode(bytes);
    SessionToken::parse(&encoded).expect("base64url output is a valid session token")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minted_tokens_are_unique() {
        let a = mint_token();
        let b = mint_token();
        assert_ne!(a, b);
        // 32 bytes -> 43 base64url chars
        assert_eq!(a.as_str().len(), 43);
    }

    #[test]
    fn test_owns_cart_user() {
        let identity = CartIdentity::User(UserId::new(1));
        assert!(identity.owns_cart(Some(UserId::new(1)), None));
        assert!(!identity.owns_cart(Some(UserId::new(2)), None));
        assert!(!identity.owns_cart(None, None));
    }

    #[test]
    fn test_owns_cart_guest() {
        let token = SessionToken::parse("tok-1").unwrap();
        let other = SessionToken::parse("tok-2").unwrap();
        let identity = CartIdentity::Guest(token.clone());
        assert!(identity.owns_cart(None, Some(&token)));
        assert!(!identity.owns_cart(None, Some(&other)));
        assert!(!identity.owns_cart(Some(UserId::new(1)), None));
    }
}
