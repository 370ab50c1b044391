//! User model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use meeplemart_core::{Email, UserId};

/// A registered storefront user.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
