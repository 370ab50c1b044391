//! User repository for database operations.

use sqlx::PgPool;

use meeplemart_core::{Email, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::user::User;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            email,
            created_at: self.created_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, created_at FROM storefront.users WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, email, created_at FROM storefront.users WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Create a new user with email and password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: UserRow = sqlx::query_as(
            "INSERT INTO storefront.users (email) VALUES ($1) RETURNING id, email, created_at",
        )
        .bind(email.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "email already exists"))?;

        let user = row.into_user()?;

        sqlx::query("INSERT INTO storefront.user_password (user_id, password_hash) VALUES ($1, $2)")
            .bind(user.id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Get a user's password hash by email.
    ///
    /// Returns `None` if the user doesn't exist or has no password set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct UserPasswordRow {
            id: i32,
            email: String,
            created_at: chrono::DateTime<chrono::Utc>,
            password_hash: Option<String>,
        }

        let row: Option<UserPasswordRow> = sqlx::query_as(
            r"
            SELECT u.id, u.email, u.created_at, p.password_hash
            FROM storefront.users u
            LEFT JOIN storefront.user_password p ON u.id = p.user_id
            WHERE u.email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let Some(password_hash) = r.password_hash else {
            return Ok(None);
        };

        let user = UserRow {
            id: r.id,
            email: r.email,
            created_at: r.created_at,
        }
        .into_user()?;

        Ok(Some((user, password_hash)))
    }
}
