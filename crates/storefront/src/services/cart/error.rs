//! Cart error types.

use thiserror::Error;

use meeplemart_core::GameId;

use crate::db::RepositoryError;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantity must be a positive integer.
    #[error("quantity must be a positive integer (got {0})")]
    InvalidQuantity(i32),

    /// Requested quantity exceeds the game's current stock.
    ///
    /// The available quantity is surfaced to the caller.
    #[error("quantity cannot exceed available stock ({available})")]
    StockExceeded {
        /// The game's current stock.
        available: i32,
    },

    /// Referenced game does not exist.
    #[error("game not found")]
    GameNotFound,

    /// Line item does not exist or belongs to someone else's cart.
    #[error("cart item not found")]
    ItemNotFound,

    /// No guest cart exists for the supplied session token.
    ///
    /// Also the answer for a second merge of the same token: the guest cart
    /// is gone, and merge deliberately does not no-op.
    #[error("guest cart not found")]
    GuestCartNotFound,

    /// The cart already holds a line item for this game.
    ///
    /// Callers update the existing item instead of adding a duplicate.
    #[error("cart already has an item for game {game_id}; update it instead")]
    DuplicateItem {
        /// The game already present in the cart.
        game_id: GameId,
    },

    /// The identity has no cart to operate on.
    #[error("this user does not have a cart")]
    NoCart,

    /// Find-or-create lost a storage-level uniqueness race twice.
    #[error("cart identity conflict")]
    IdentityConflict,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
