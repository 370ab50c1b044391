//! Auth route handlers.
//!
//! Session-cookie login. After a guest logs in, the client calls
//! `POST /cart/merge` with its old cart token to carry the guest cart over;
//! login itself never touches carts.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::models::user::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Create a new account.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = AuthService::new(state.pool())
        .register_with_password(&request.email, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in and establish a session.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool())
        .login_with_password(&request.email, &request.password)
        .await?;

    // New session id on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("failed to cycle session id: {e}")))?;

    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
    };
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store session user: {e}")))?;

    Ok(Json(user))
}

/// Log out.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear session user: {e}")))?;

    Ok(StatusCode::NO_CONTENT)
}
