pub mod handlers;
pub mod repository;

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::auth::password::hash_password;
use crate::config::BootstrapAdmin;
use crate::models::user::{Department, Role};
use repository::NewUser;

/// Creates the first super admin when the user table is empty.
/// Returns `true` if an account was created.
pub async fn ensure_bootstrap_admin(pool: &SqlitePool, admin: Option<&BootstrapAdmin>) -> Result<bool> {
    if repository::count_users(pool).await? > 0 {
        return Ok(false);
    }
    let Some(admin) = admin else {
        tracing::warn!("No users exist and ADMIN_EMAIL/ADMIN_PASSWORD are not set; nobody can log in");
        return Ok(false);
    };

    let password_hash = hash_password(&admin.password).map_err(|e| anyhow::anyhow!("{e}"))?;
    repository::insert_user(
        pool,
        NewUser {
            email: &admin.email,
            full_name: &admin.full_name,
            role: Role::SuperAdmin,
            department: Department::Management,
            password_hash: &password_hash,
        },
        Utc::now(),
    )
    .await
    .context("Failed to create bootstrap admin")?;

    info!("Bootstrap super admin {} created", admin.email);
    Ok(true)
}
