use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::password::verify_password;
use crate::auth::token::issue_token;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::user::UserProfile;
use crate::state::AppState;
use crate::users::repository;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = repository::find_by_email(&state.db, &req.email)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&req.password, &user.password_hash) {
        tracing::info!("Failed login for user {}", user.id);
        return Err(AppError::Unauthorized);
    }

    let now = Utc::now();
    let issued = issue_token(&user, &state.config.jwt_secret, state.config.token_ttl_hours, now)?;
    repository::touch_last_login(&state.db, user.id, now).await?;

    let mut profile = UserProfile::from(&user);
    profile.last_login = Some(now);

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: profile,
    }))
}

/// GET /api/auth/me
pub async fn handle_me(user: AuthUser, State(state): State<AppState>) -> Result<Json<UserProfile>, AppError> {
    let row = repository::get_user(&state.db, user.id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(UserProfile::from(&row)))
}
