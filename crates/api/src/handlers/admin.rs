//! Handlers for `/admin/users` (user management).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use aidlink_core::types::DbId;
use aidlink_core::validation::validate_email;
use aidlink_db::models::role::Role;
use aidlink_db::models::user::{UpdateUser, User, UserResponse};
use aidlink_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use aidlink_db::{clamp_limit, clamp_offset};
use aidlink_events::{ChangeAction, ChangeEvent};

use crate::error::{AppError, AppResult};
use crate::handlers::auth::resolve_role;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /admin/users`.
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    /// Matches name or email, case-insensitively.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `PUT /admin/users/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    /// Role name, `admin` or `user`.
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let users = UserRepo::list(&state.pool, search, limit, offset).await?;

    // One roles query for the whole page.
    let roles = RoleRepo::list(&state.pool).await?;
    let data = users
        .iter()
        .map(|u| UserResponse::from_user(u, role_name(&roles, u.role_id)))
        .collect();

    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = find_user(&state, id).await?;
    let role = resolve_role(&state, &user).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from_user(&user, role),
    }))
}

/// PUT /api/v1/admin/users/{id}
///
/// Change name, email, role or active flag. Deactivating a user revokes
/// their sessions. Admins cannot demote or deactivate themselves.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let role = match input.role.as_deref() {
        Some(name) => Some(
            RoleRepo::find_by_name(&state.pool, name)
                .await?
                .ok_or_else(|| AppError::validation(format!("Unknown role '{name}'")))?,
        ),
        None => None,
    };

    if id == admin.user_id {
        if input.is_active == Some(false) {
            return Err(AppError::validation("You cannot deactivate your own account"));
        }
        if role.as_ref().is_some_and(|r| r.name != admin.role) {
            return Err(AppError::validation("You cannot change your own role"));
        }
    }

    let email = match input.email {
        Some(email) => {
            let email = email.trim().to_lowercase();
            validate_email(&email)?;
            Some(email)
        }
        None => None,
    };
    let full_name = match input.full_name {
        Some(name) if name.trim().chars().count() < 2 => {
            return Err(AppError::validation("Full name must be at least 2 characters"));
        }
        other => other.map(|n| n.trim().to_string()),
    };

    let update = UpdateUser {
        full_name,
        email,
        role_id: role.as_ref().map(|r| r.id),
        is_active: input.is_active,
    };
    let user = UserRepo::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    if input.is_active == Some(false) {
        let revoked = SessionRepo::revoke_all_for_user(&state.pool, id).await?;
        tracing::info!(user_id = id, admin_id = admin.user_id, revoked, "User deactivated");
    }
    state.publish(ChangeEvent::new("users", ChangeAction::Update, id).with_user(id));

    let role = resolve_role(&state, &user).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from_user(&user, role),
    }))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Soft delete: the account is deactivated and its sessions revoked.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::validation("You cannot deactivate your own account"));
    }

    find_user(&state, id).await?;
    if UserRepo::deactivate(&state.pool, id).await? {
        let revoked = SessionRepo::revoke_all_for_user(&state.pool, id).await?;
        tracing::info!(user_id = id, admin_id = admin.user_id, revoked, "User deactivated");
        state.publish(ChangeEvent::new("users", ChangeAction::Update, id).with_user(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))
}

fn role_name(roles: &[Role], role_id: DbId) -> String {
    roles
        .iter()
        .find(|r| r.id == role_id)
        .map(|r| r.name.clone())
        .unwrap_or_else(|| "unknown".to_string())
}
