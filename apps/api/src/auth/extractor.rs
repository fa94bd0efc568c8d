use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{header, request::Parts},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::permissions::{has_permission, Permission};
use crate::auth::token::verify_token;
use crate::errors::AppError;
use crate::models::user::{Department, Role};
use crate::state::AppState;
use crate::users;

/// The authenticated caller, resolved from `Authorization: Bearer <token>`
/// or, for EventSource clients that cannot set headers, `?access_token=`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: Department,
}

impl AuthUser {
    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if has_permission(self.role, permission) {
            Ok(())
        } else {
            tracing::debug!("User {} ({:?}) lacks {}", self.id, self.role, permission.as_str());
            Err(AppError::Forbidden)
        }
    }
}

#[derive(Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let from_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());
    from_header.or_else(|| {
        Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.access_token)
    })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let claims = verify_token(&token, &state.config.jwt_secret)?;

        // Role and activation come from the stored row, not the token, so
        // demotions and deactivations apply before the token expires.
        let row = users::repository::get_user(&state.db, claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser {
            id: row.id,
            name: row.full_name,
            email: row.email,
            role: row.role,
            department: row.department,
        })
    }
}
