//! Authentication Handlers
//!
//! Signup, login, and account management.

use std::time::Duration;

use axum::{Extension, Json, extract::{Path, State}};
use validator::Validate;

use shared::models::UserPublic;
use shared::request::{LoginRequest, SignupRequest};
use shared::response::{LoginResponse, MessageResponse, UsersResponse};
use shared::types::{Department, Role};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::UserCreate;
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResult};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Signup handler
///
/// Citizens self-register; an inspector signup carries a department and is
/// held for admin approval.
pub async fn signup(
    State(state): State<ServerState>,
    Json(req): Json<SignupRequest>,
) -> AppResult<Json<UserPublic>> {
    req.validate()?;

    let role = match req.role.as_deref() {
        None | Some("") => Role::User,
        Some(value) => value
            .parse::<Role>()
            .map_err(|_| AppError::validation(format!("Unknown role: {}", value)))?,
    };
    if role == Role::Admin {
        return Err(AppError::forbidden(
            "Admin accounts cannot be self-registered".to_string(),
        ));
    }

    let department = parse_department(role, req.department.as_deref())?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .create(UserCreate {
            name: req.name,
            email: req.email,
            password: req.password,
            role,
            department,
        })
        .await
        .map_err(AppError::from)?;

    tracing::info!(user_id = user.user_id, role = %user.role, "Account created");
    Ok(Json(user.to_public()))
}

/// Login handler
///
/// Verifies credentials and returns a JWT plus the public account view.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .find_by_email(&req.email)
        .await
        .map_err(AppError::from)?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent email enumeration
    let user = match user {
        Some(u) => {
            let password_valid = u
                .verify_password(&req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

            if !password_valid {
                tracing::warn!(email = %req.email, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }
            u
        }
        None => {
            tracing::warn!(email = %req.email, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    if !user.is_approved {
        return Err(AppError::forbidden(
            "Account is pending approval".to_string(),
        ));
    }

    let token = state
        .jwt_service
        .generate_token(
            user.user_id,
            &user.name,
            &user.email,
            user.role.as_str(),
            user.department.map(|d| d.as_str()),
        )
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(user_id = user.user_id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: user.to_public(),
    }))
}

/// Current account info
pub async fn me(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<UserPublic>> {
    let repo = UserRepository::new(state.db.clone());
    let record = repo
        .find_by_id(user.id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", user.id)))?;
    Ok(Json(record.to_public()))
}

/// List all accounts (admin only)
pub async fn list_users(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<UsersResponse>> {
    user.require_admin()?;

    let repo = UserRepository::new(state.db.clone());
    let users = repo
        .find_all()
        .await
        .map_err(AppError::from)?
        .iter()
        .map(|u| u.to_public())
        .collect();
    Ok(Json(UsersResponse { users }))
}

/// Delete an account (admin only)
pub async fn delete_user(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    user.require_admin()?;

    if id == user.id {
        return Err(AppError::business_rule(
            "Admins cannot delete their own account".to_string(),
        ));
    }

    let repo = UserRepository::new(state.db.clone());
    repo.delete(id).await.map_err(AppError::from)?;

    tracing::info!(deleted_user = id, by = user.id, "Account deleted");
    Ok(Json(MessageResponse::success("User deleted")))
}

/// Resolve and validate the department field for a new account
fn parse_department(role: Role, department: Option<&str>) -> AppResult<Option<Department>> {
    match (role, department) {
        (Role::Inspector, Some(value)) if !value.is_empty() => {
            let dept = value
                .parse::<Department>()
                .map_err(|_| AppError::validation(format!("Unknown department: {}", value)))?;
            if !Department::assignable().contains(&dept) {
                return Err(AppError::validation(
                    "Inspectors must belong to Roads or Garbage".to_string(),
                ));
            }
            Ok(Some(dept))
        }
        (Role::Inspector, _) => Err(AppError::validation(
            "Inspector accounts require a department".to_string(),
        )),
        _ => Ok(None),
    }
}
