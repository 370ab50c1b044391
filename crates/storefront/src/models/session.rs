//! Session-related types.
//!
//! Types stored in the cookie session for authentication and guest-cart state.

use serde::{Deserialize, Serialize};

use meeplemart_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the anonymous cart session token.
    ///
    /// Minted on the first guest add-to-cart and removed once the guest cart
    /// is merged into a user cart.
    pub const CART_TOKEN: &str = "cart_token";
}
