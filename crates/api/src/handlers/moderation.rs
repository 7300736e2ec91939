//! Admin moderation of project proposals.
//!
//! Each action checks the transition, applies it with a compare-and-set on
//! the current status, notifies the owner (row plus email) and publishes a
//! change event. A concurrent moderator who loses the race gets 409.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use aidlink_core::notification_kinds::{
    KIND_PROJECT_APPROVED, KIND_PROJECT_COMPLETED, KIND_PROJECT_REJECTED,
};
use aidlink_core::status::ProjectStatus;
use aidlink_core::types::DbId;
use aidlink_db::models::project::Project;
use aidlink_db::repositories::{FundRepo, ProjectRepo};
use aidlink_events::{ChangeAction, ChangeEvent, EmailMessage};

use crate::error::{AppError, AppResult};
use crate::handlers::project::find_project;
use crate::middleware::rbac::RequireAdmin;
use crate::notifications::Notice;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

/// POST /api/v1/admin/projects/{id}/approve
pub async fn approve_project(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = transition(&state, id, ProjectStatus::Approved, None).await?;
    tracing::info!(project_id = id, admin_id = admin.user_id, "Project approved");

    let link = state.config.project_link(id);
    let notice = Notice::new(
        KIND_PROJECT_APPROVED,
        "Project approved",
        format!("\"{}\" is now live and accepting donations.", project.title),
    )
    .for_project(id)
    .with_email(EmailMessage::project_approved(&project.title, &link));
    state.notifier.notify(project.owner_id, &notice).await;

    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/admin/projects/{id}/reject
///
/// A non-blank reason is required and shown to the owner.
pub async fn reject_project(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<RejectRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let reason = input.reason.trim();
    if reason.is_empty() {
        return Err(AppError::validation("A rejection reason is required"));
    }

    let project = transition(&state, id, ProjectStatus::Rejected, Some(reason)).await?;
    tracing::info!(project_id = id, admin_id = admin.user_id, "Project rejected");

    let link = state.config.project_link(id);
    let notice = Notice::new(
        KIND_PROJECT_REJECTED,
        "Project not approved",
        format!("\"{}\" was not approved: {reason}", project.title),
    )
    .for_project(id)
    .with_email(EmailMessage::project_rejected(&project.title, reason, &link));
    state.notifier.notify(project.owner_id, &notice).await;

    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/admin/projects/{id}/complete
///
/// Close an approved project to new donations.
pub async fn complete_project(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = transition(&state, id, ProjectStatus::Completed, None).await?;
    tracing::info!(project_id = id, admin_id = admin.user_id, "Project completed");

    match FundRepo::total_paid(&state.pool, Some(id)).await {
        Ok(raised) => {
            let notice = Notice::new(
                KIND_PROJECT_COMPLETED,
                "Project completed",
                format!(
                    "\"{}\" is complete. Total raised: {}.",
                    project.title,
                    aidlink_core::money::format_php(raised)
                ),
            )
            .for_project(id)
            .with_email(EmailMessage::project_completed(&project.title, raised));
            state.notifier.notify(project.owner_id, &notice).await;
        }
        Err(e) => {
            tracing::warn!(project_id = id, error = %e, "Could not total donations for completion notice");
        }
    }

    Ok(Json(DataResponse { data: project }))
}

async fn transition(
    state: &AppState,
    id: DbId,
    to: ProjectStatus,
    rejection_reason: Option<&str>,
) -> AppResult<Project> {
    let current = find_project(state, id).await?.status();
    current.ensure_transition(to)?;

    let project = ProjectRepo::set_status(&state.pool, id, current, to, rejection_reason)
        .await?
        .ok_or_else(|| AppError::conflict("Project status was changed by another request"))?;

    state.publish(
        ChangeEvent::new("projects", ChangeAction::Update, id)
            .with_project(id)
            .with_user(project.owner_id),
    );
    Ok(project)
}
