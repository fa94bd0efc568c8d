use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::auth::permissions::Permission;
use crate::auth::AuthUser;
use crate::errors::{AppError, FieldError};
use crate::models::user::{Department, Role, User, UserProfile};
use crate::state::AppState;
use crate::users::repository::{self, NewUser, UserChanges};

pub const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub department: Option<Department>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub department: Option<Department>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    let email = email.trim();
    let valid = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'))
        .unwrap_or(false);
    if !valid {
        errors.push(FieldError::new("email", "Email inválido."));
    }
}

fn check_password(password: &str, errors: &mut Vec<FieldError>) {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        errors.push(FieldError::new(
            "password",
            format!("La contraseña debe tener al menos {MIN_PASSWORD_CHARS} caracteres."),
        ));
    }
}

/// GET /api/users
pub async fn handle_list_users(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    user.require(Permission::UsersRead)?;
    let users = repository::list_users(&state.db).await?;
    Ok(Json(users.iter().map(UserProfile::from).collect()))
}

/// POST /api/users
pub async fn handle_create_user(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    user.require(Permission::UsersCreate)?;

    let mut errors = Vec::new();
    let email = req.email.unwrap_or_default();
    let full_name = req.full_name.unwrap_or_default();
    let password = req.password.unwrap_or_default();
    check_email(&email, &mut errors);
    if full_name.trim().is_empty() {
        errors.push(FieldError::new("full_name", "El nombre es requerido."));
    }
    if req.role.is_none() {
        errors.push(FieldError::new("role", "El rol es requerido."));
    }
    if req.department.is_none() {
        errors.push(FieldError::new("department", "El departamento es requerido."));
    }
    check_password(&password, &mut errors);

    let (Some(role), Some(department)) = (req.role, req.department) else {
        return Err(AppError::InvalidInput(errors));
    };
    if !errors.is_empty() {
        return Err(AppError::InvalidInput(errors));
    }

    if repository::email_taken(&state.db, &email, None).await? {
        return Err(AppError::Conflict("Ya existe un usuario con este email".into()));
    }

    let password_hash = hash_password(&password)?;
    let created = repository::insert_user(
        &state.db,
        NewUser {
            email: &email,
            full_name: &full_name,
            role,
            department,
            password_hash: &password_hash,
        },
        Utc::now(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(UserProfile::from(&created))))
}

/// Role changes and edits to super_admin accounts need the user-creation
/// permission; nobody changes their own role.
fn check_role_change(user: &AuthUser, target: &User, new_role: Option<Role>) -> Result<(), AppError> {
    let role_changes = new_role.is_some_and(|role| role != target.role);
    if role_changes && target.id == user.id {
        return Err(AppError::Validation("No puede cambiar su propio rol".into()));
    }
    if role_changes || (target.role == Role::SuperAdmin && target.id != user.id) {
        user.require(Permission::UsersCreate)?;
    }
    Ok(())
}

/// PUT /api/users/:id
pub async fn handle_update_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>, AppError> {
    user.require(Permission::UsersUpdate)?;
    let target = repository::get_user(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Usuario {id} no encontrado")))?;
    check_role_change(&user, &target, req.role)?;

    let mut errors = Vec::new();
    if let Some(email) = &req.email {
        check_email(email, &mut errors);
    }
    if let Some(name) = &req.full_name {
        if name.trim().is_empty() {
            errors.push(FieldError::new("full_name", "El nombre es requerido."));
        }
    }
    if let Some(password) = &req.password {
        check_password(password, &mut errors);
    }
    if !errors.is_empty() {
        return Err(AppError::InvalidInput(errors));
    }

    if let Some(email) = &req.email {
        if repository::email_taken(&state.db, email, Some(id)).await? {
            return Err(AppError::Conflict("Ya existe un usuario con este email".into()));
        }
    }

    let password_hash = req.password.as_deref().map(hash_password).transpose()?;
    let changes = UserChanges {
        email: req.email,
        full_name: req.full_name,
        role: req.role,
        department: req.department,
        password_hash,
        is_active: req.is_active,
    };

    let updated = repository::update_user(&state.db, id, changes, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Usuario {id} no encontrado")))?;
    if updated.role != target.role {
        tracing::info!("User {id} role changed {:?} -> {:?} by {}", target.role, updated.role, user.email);
    }
    Ok(Json(UserProfile::from(&updated)))
}

/// DELETE /api/users/:id
pub async fn handle_delete_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    user.require(Permission::UsersDelete)?;
    if id == user.id {
        return Err(AppError::Validation("No puede eliminar su propio usuario".into()));
    }
    if !repository::delete_user(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Usuario {id} no encontrado")));
    }
    tracing::info!("User {id} deleted by {}", user.email);
    Ok(StatusCode::NO_CONTENT)
}
