use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{Department, Role, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: Department,
    pub iat: i64,
    pub exp: i64,
}

pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub fn issue_token(user: &User, secret: &str, ttl_hours: i64, now: DateTime<Utc>) -> Result<IssuedToken, AppError> {
    let expires_at = now + Duration::hours(ttl_hours);
    let claims = Claims {
        sub: user.id,
        name: user.full_name.clone(),
        email: user.email.clone(),
        role: user.role,
        department: user.department,
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("token encoding failed: {e}")))?;
    Ok(IssuedToken { token, expires_at })
}

/// Any decoding failure, expiry included, is reported as `Unauthorized`.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("Rejected bearer token: {e}");
            AppError::Unauthorized
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "ana@example.com".into(),
            full_name: "Ana Torres".into(),
            role: Role::Recruiter,
            department: Department::Hr,
            password_hash: String::new(),
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issued_token_verifies() {
        let u = user();
        let issued = issue_token(&u, "k", 2, Utc::now()).unwrap();
        let claims = verify_token(&issued.token, "k").unwrap();
        assert_eq!(claims.sub, u.id);
        assert_eq!(claims.role, Role::Recruiter);
        assert_eq!(claims.name, "Ana Torres");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issued = issue_token(&user(), "k", 2, Utc::now()).unwrap();
        assert!(matches!(verify_token(&issued.token, "other"), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issued = issue_token(&user(), "k", 1, Utc::now() - Duration::hours(3)).unwrap();
        assert!(matches!(verify_token(&issued.token, "k"), Err(AppError::Unauthorized)));
    }
}
