//! Handlers for progress updates posted by project owners.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use aidlink_core::notification_kinds::KIND_PROJECT_UPDATE;
use aidlink_core::types::DbId;
use aidlink_core::validation::validate_update;
use aidlink_db::models::project_update::{CreateProjectUpdate, ProjectUpdate};
use aidlink_db::repositories::{FundRepo, ProjectUpdateRepo};
use aidlink_events::{ChangeAction, ChangeEvent, EmailMessage};

use crate::error::{AppError, AppResult};
use crate::handlers::project::{find_project, find_visible_project};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::notifications::Notice;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
}

/// GET /api/v1/projects/{id}/updates
pub async fn list_updates(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(project_id): Path<DbId>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ProjectUpdate>>>> {
    find_visible_project(&state, project_id, viewer.user()).await?;
    let updates =
        ProjectUpdateRepo::list_for_project(&state.pool, project_id, page.limit(), page.offset())
            .await?;
    Ok(Json(DataResponse { data: updates }))
}

/// POST /api/v1/projects/{id}/updates
///
/// Owner only, on a live project. Every distinct donor with a paid
/// donation is notified.
pub async fn create_update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<UpdateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ProjectUpdate>>)> {
    validate_update(&input.title, &input.body)?;

    let project = find_project(&state, project_id).await?;
    if project.owner_id != auth.user_id {
        return Err(AppError::forbidden("Only the project owner can post updates"));
    }
    if !project.status().is_public() {
        return Err(AppError::conflict(
            "Updates can only be posted on approved projects",
        ));
    }

    let update = ProjectUpdateRepo::create(
        &state.pool,
        &CreateProjectUpdate {
            project_id,
            author_id: auth.user_id,
            title: input.title,
            body: input.body,
            image_url: input.image_url,
        },
    )
    .await?;

    state.publish(
        ChangeEvent::new("project_updates", ChangeAction::Insert, update.id)
            .with_project(project_id)
            .with_user(auth.user_id),
    );

    // The update is stored; a failed donor lookup only skips the announcement.
    let donors: Vec<DbId> = match FundRepo::distinct_donor_ids(&state.pool, project_id).await {
        Ok(ids) => ids.into_iter().filter(|id| *id != auth.user_id).collect(),
        Err(e) => {
            tracing::warn!(update_id = update.id, project_id, error = %e, "Could not load donors to notify");
            Vec::new()
        }
    };
    if !donors.is_empty() {
        let link = state.config.project_link(project_id);
        let notice = Notice::new(
            KIND_PROJECT_UPDATE,
            format!("Update on \"{}\"", project.title),
            update.title.clone(),
        )
        .for_project(project_id)
        .with_email(EmailMessage::project_update(
            &project.title,
            &update.title,
            &link,
        ));
        let delivered = state.notifier.notify_many(&donors, &notice).await;
        tracing::info!(
            update_id = update.id,
            project_id,
            donors = donors.len(),
            delivered,
            "Project update announced"
        );
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: update })))
}

/// DELETE /api/v1/updates/{id}
///
/// The author or an admin.
pub async fn delete_update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let update = ProjectUpdateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Update", id))?;
    if update.author_id != auth.user_id && !auth.is_admin() {
        return Err(AppError::forbidden(
            "Only the author or an admin can delete this update",
        ));
    }

    if !ProjectUpdateRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Update", id));
    }
    state.publish(
        ChangeEvent::new("project_updates", ChangeAction::Delete, id)
            .with_project(update.project_id)
            .with_user(update.author_id),
    );
    Ok(StatusCode::NO_CONTENT)
}
