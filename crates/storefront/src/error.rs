//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; failures become JSON bodies of the shape
//! `{"detail": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => repository_status(err),
            Self::Cart(err) => cart_status(err),
            Self::Auth(err) => auth_status(err),
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing detail message. Internal errors are not leaked.
    fn detail(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Database(err) => repository_detail(err),
            Self::Cart(err) => match err {
                CartError::Repository(err) => repository_detail(err),
                other => other.to_string(),
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                _ => "Internal server error".to_string(),
            },
            _ => self.to_string(),
        }
    }
}

fn repository_detail(err: &RepositoryError) -> String {
    match err {
        RepositoryError::NotFound => "not found".to_string(),
        RepositoryError::Conflict(msg) => msg.clone(),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            "Internal server error".to_string()
        }
    }
}

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn cart_status(err: &CartError) -> StatusCode {
    match err {
        CartError::InvalidQuantity(_) | CartError::StockExceeded { .. } | CartError::NoCart => {
            StatusCode::BAD_REQUEST
        }
        CartError::GameNotFound | CartError::ItemNotFound | CartError::GuestCartNotFound => {
            StatusCode::NOT_FOUND
        }
        CartError::DuplicateItem { .. } | CartError::IdentityConflict => StatusCode::CONFLICT,
        CartError::Repository(err) => repository_status(err),
    }
}

fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::UserAlreadyExists => StatusCode::CONFLICT,
        AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
        AuthError::Repository(_) | AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("game 123".to_string());
        assert_eq!(err.to_string(), "Not found: game 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_cart_error_status_codes() {
        assert_eq!(
            get_status(AppError::Cart(CartError::InvalidQuantity(0))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::StockExceeded { available: 5 })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::GuestCartNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::DuplicateItem {
                game_id: meeplemart_core::GameId::new(1)
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::NoCart)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_stock_exceeded_detail_surfaces_available() {
        let err = AppError::Cart(CartError::StockExceeded { available: 5 });
        assert!(err.detail().contains('5'));
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let err = AppError::Internal("connection refused to 10.0.0.3".to_string());
        assert_eq!(err.detail(), "Internal server error");
    }
}
