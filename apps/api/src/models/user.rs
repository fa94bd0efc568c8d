use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::permissions::{permissions_for, Permission};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    HrManager,
    Recruiter,
    Interviewer,
}

impl Role {
    /// Roles allowed to moderate other people's chat messages.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Department {
    Hr,
    It,
    Finance,
    Operations,
    Management,
}

impl Department {
    /// Same spelling as the JSON and database value.
    pub fn as_str(self) -> &'static str {
        match self {
            Department::Hr => "hr",
            Department::It => "it",
            Department::Finance => "finance",
            Department::Operations => "operations",
            Department::Management => "management",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub department: Department,
    pub password_hash: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub department: Department,
    pub is_active: bool,
    pub permissions: Vec<Permission>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            department: user.department,
            is_active: user.is_active,
            permissions: permissions_for(user.role).to_vec(),
            last_login: user.last_login,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
