//! Dashboard summaries.

use axum::extract::State;
use axum::Json;

use aidlink_db::models::dashboard::{AdminStats, UserStats};
use aidlink_db::repositories::DashboardRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard
///
/// The caller's own projects, money raised and donated, and unread count.
pub async fn user_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserStats>>> {
    let stats = DashboardRepo::user_stats(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/admin/dashboard
pub async fn admin_dashboard(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<AdminStats>>> {
    let stats = DashboardRepo::admin_stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}
