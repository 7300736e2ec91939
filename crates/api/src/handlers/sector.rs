//! Handlers for sectors (project categories).
//!
//! Listing is public; create, update and delete are admin-only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use aidlink_core::types::DbId;
use aidlink_core::validation::validate_sector_name;
use aidlink_db::models::sector::{CreateSector, Sector, SectorWithCounts, UpdateSector};
use aidlink_db::repositories::SectorRepo;
use aidlink_events::{ChangeAction, ChangeEvent};

use crate::error::{is_foreign_key_violation, AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/sectors
pub async fn list_sectors(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<SectorWithCounts>>>> {
    let sectors = SectorRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: sectors }))
}

/// POST /api/v1/admin/sectors
pub async fn create_sector(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateSector>,
) -> AppResult<(StatusCode, Json<DataResponse<Sector>>)> {
    validate_sector_name(&input.name)?;

    let sector = SectorRepo::create(&state.pool, &input).await?;
    tracing::info!(sector_id = sector.id, admin_id = admin.user_id, "Sector created");
    state.publish(ChangeEvent::new("sectors", ChangeAction::Insert, sector.id));

    Ok((StatusCode::CREATED, Json(DataResponse { data: sector })))
}

/// PUT /api/v1/admin/sectors/{id}
pub async fn update_sector(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSector>,
) -> AppResult<Json<DataResponse<Sector>>> {
    if let Some(name) = &input.name {
        validate_sector_name(name)?;
    }

    let sector = SectorRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Sector", id))?;
    state.publish(ChangeEvent::new("sectors", ChangeAction::Update, id));

    Ok(Json(DataResponse { data: sector }))
}

/// DELETE /api/v1/admin/sectors/{id}
///
/// Refused with 409 while any project is filed under the sector.
pub async fn delete_sector(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    match SectorRepo::delete(&state.pool, id).await {
        Ok(true) => {
            state.publish(ChangeEvent::new("sectors", ChangeAction::Delete, id));
            Ok(StatusCode::NO_CONTENT)
        }
        Ok(false) => Err(AppError::not_found("Sector", id)),
        Err(e) if is_foreign_key_violation(&e) => Err(AppError::conflict(
            "Sector still has projects or donations and cannot be deleted",
        )),
        Err(e) => Err(e.into()),
    }
}
