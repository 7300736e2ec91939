//! Handlers for projects and their bank details.
//!
//! Approved and completed projects are public. Pending and rejected ones
//! are visible only to their owner and to admins; everyone else gets 404.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use aidlink_core::crypto::{mask_account_number, BankDetails};
use aidlink_core::money::progress_pct;
use aidlink_core::notification_kinds::KIND_PROJECT_SUBMITTED;
use aidlink_core::status::ProjectStatus;
use aidlink_core::types::{Centavos, DbId};
use aidlink_core::validation::{
    validate_account_number, validate_project_description, validate_project_title,
    validate_target_amount,
};
use aidlink_db::models::project::{
    CreateProject, Project, ProjectDetail, ProjectFilter, UpdateProject,
};
use aidlink_db::repositories::{BankDetailRepo, ProjectRepo, SectorRepo, UserRepo};
use aidlink_events::{ChangeAction, ChangeEvent, EmailMessage};

use crate::error::{is_foreign_key_violation, AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::notifications::Notice;
use crate::query::PaginationParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /projects` and `GET /projects/mine`.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectListParams {
    pub status: Option<ProjectStatus>,
    pub sector_id: Option<DbId>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProjectListParams {
    fn page(&self) -> PaginationParams {
        PaginationParams {
            limit: self.limit,
            offset: self.offset,
        }
    }

    fn search(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub sector_id: DbId,
    pub title: String,
    pub description: String,
    /// Funding goal in centavos.
    pub target_amount: Centavos,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub deadline: Option<NaiveDate>,
    /// Account donors can send bank transfers to.
    pub bank_details: Option<BankDetails>,
}

/// A project with its funding progress.
#[derive(Debug, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: ProjectDetail,
    /// Percentage of the target raised, capped at 100.
    pub progress_pct: f64,
}

impl From<ProjectDetail> for ProjectView {
    fn from(project: ProjectDetail) -> Self {
        let progress_pct = progress_pct(project.raised_amount, project.target_amount);
        Self {
            project,
            progress_pct,
        }
    }
}

/// Decrypted bank details. `masked` is true when the account number shows
/// only its last four digits.
#[derive(Debug, Serialize)]
pub struct BankDetailsView {
    pub project_id: DbId,
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub masked: bool,
}

// ---------------------------------------------------------------------------
// Listing and detail
// ---------------------------------------------------------------------------

/// GET /api/v1/projects
///
/// Public listing of approved and completed projects. Admins may filter on
/// any status; other callers asking for pending or rejected get 403.
pub async fn list_projects(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Query(params): Query<ProjectListParams>,
) -> AppResult<Json<PageResponse<ProjectView>>> {
    let statuses = match params.status {
        Some(status) if status.is_public() || viewer.is_admin() => vec![status],
        Some(_) => {
            return Err(AppError::forbidden(
                "Only administrators can list pending or rejected projects",
            ));
        }
        None if viewer.is_admin() => Vec::new(),
        None => vec![ProjectStatus::Approved, ProjectStatus::Completed],
    };

    let page = params.page();
    let filter = ProjectFilter {
        statuses,
        sector_id: params.sector_id,
        owner_id: None,
        search: params.search(),
        limit: page.limit(),
        offset: page.offset(),
    };
    list_page(&state, filter).await
}

/// GET /api/v1/projects/mine
///
/// The caller's own proposals in every status.
pub async fn my_projects(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ProjectListParams>,
) -> AppResult<Json<PageResponse<ProjectView>>> {
    let page = params.page();
    let filter = ProjectFilter {
        statuses: params.status.into_iter().collect(),
        sector_id: params.sector_id,
        owner_id: Some(auth.user_id),
        search: params.search(),
        limit: page.limit(),
        offset: page.offset(),
    };
    list_page(&state, filter).await
}

async fn list_page(
    state: &AppState,
    filter: ProjectFilter,
) -> AppResult<Json<PageResponse<ProjectView>>> {
    let (projects, total) = tokio::try_join!(
        ProjectRepo::list(&state.pool, &filter),
        ProjectRepo::count(&state.pool, &filter),
    )?;

    Ok(Json(PageResponse {
        data: projects.into_iter().map(ProjectView::from).collect(),
        total,
        limit: filter.limit,
        offset: filter.offset,
    }))
}

/// GET /api/v1/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectView>>> {
    let detail = ProjectRepo::find_detail(&state.pool, id)
        .await?
        .filter(|p| p.status().is_public() || viewer.can_manage(p.owner_id))
        .ok_or_else(|| AppError::not_found("Project", id))?;

    Ok(Json(DataResponse {
        data: detail.into(),
    }))
}

// ---------------------------------------------------------------------------
// Proposal lifecycle
// ---------------------------------------------------------------------------

/// POST /api/v1/projects
///
/// Propose a project. It starts `pending`; bank details, when given, are
/// encrypted and stored in the same transaction. Every admin is notified.
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    validate_project_title(&input.title)?;
    validate_project_description(&input.description)?;
    validate_target_amount(input.target_amount)?;
    validate_deadline(input.deadline)?;
    ensure_sector_exists(&state, input.sector_id).await?;

    let encrypted = match &input.bank_details {
        Some(details) => {
            validate_bank_details(details)?;
            Some(state.config.bank_cipher.encrypt_bank_details(details)?)
        }
        None => None,
    };

    let create = CreateProject {
        owner_id: auth.user_id,
        sector_id: input.sector_id,
        title: input.title.trim().to_string(),
        description: input.description.trim().to_string(),
        target_amount: input.target_amount,
        image_url: input.image_url,
        location: input.location,
        deadline: input.deadline,
    };
    let project = ProjectRepo::create(&state.pool, &create, encrypted.as_ref()).await?;

    tracing::info!(project_id = project.id, owner_id = auth.user_id, "Project proposed");
    state.publish(
        ChangeEvent::new("projects", ChangeAction::Insert, project.id)
            .with_project(project.id)
            .with_user(auth.user_id),
    );
    notify_admins_of_submission(&state, &project).await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// PUT /api/v1/projects/{id}
///
/// Owner edit while the project is pending or rejected. Editing a rejected
/// project resubmits it for review.
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = find_project(&state, id).await?;
    if project.owner_id != auth.user_id {
        return Err(AppError::forbidden("Only the project owner can edit it"));
    }
    if !project.status().is_editable() {
        return Err(AppError::conflict(
            "Only pending or rejected projects can be edited",
        ));
    }

    if let Some(title) = &input.title {
        validate_project_title(title)?;
    }
    if let Some(description) = &input.description {
        validate_project_description(description)?;
    }
    if let Some(target) = input.target_amount {
        validate_target_amount(target)?;
    }
    validate_deadline(input.deadline)?;
    if let Some(sector_id) = input.sector_id {
        ensure_sector_exists(&state, sector_id).await?;
    }

    let updated = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::conflict("Project was reviewed while being edited"))?;

    state.publish(
        ChangeEvent::new("projects", ChangeAction::Update, id)
            .with_project(id)
            .with_user(auth.user_id),
    );

    if project.status() == ProjectStatus::Rejected {
        tracing::info!(project_id = id, "Rejected project resubmitted");
        notify_admins_of_submission(&state, &updated).await;
    }

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/projects/{id}
///
/// Owners may withdraw a pending proposal; admins may delete any project
/// that has no donations on record.
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let project = find_project(&state, id).await?;

    if !auth.is_admin() {
        if project.owner_id != auth.user_id {
            return Err(AppError::forbidden("Only the project owner can delete it"));
        }
        if project.status() != ProjectStatus::Pending {
            return Err(AppError::conflict("Only pending projects can be withdrawn"));
        }
    }

    match ProjectRepo::delete(&state.pool, id).await {
        Ok(true) => {}
        Ok(false) => return Err(AppError::not_found("Project", id)),
        Err(e) if is_foreign_key_violation(&e) => {
            return Err(AppError::conflict(
                "Project has donations on record and cannot be deleted",
            ));
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(project_id = id, user_id = auth.user_id, "Project deleted");
    state.publish(ChangeEvent::new("projects", ChangeAction::Delete, id).with_project(id));
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Bank details
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{id}/bank-details
///
/// Owner and admins see the full account number at any status. Others see
/// a masked number, and only once the project is approved.
pub async fn get_bank_details(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BankDetailsView>>> {
    let project = find_project(&state, id).await?;
    let full_access = viewer.can_manage(project.owner_id);
    if !full_access && project.status() != ProjectStatus::Approved {
        return Err(AppError::not_found("Project", id));
    }

    let row = BankDetailRepo::find_by_project(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("BankDetails", id))?;
    let details = state.config.bank_cipher.decrypt_bank_details(&row.encrypted())?;

    Ok(Json(DataResponse {
        data: bank_details_view(id, details, !full_access),
    }))
}

/// PUT /api/v1/projects/{id}/bank-details
pub async fn put_bank_details(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<BankDetails>,
) -> AppResult<Json<DataResponse<BankDetailsView>>> {
    let project = find_project(&state, id).await?;
    if project.owner_id != auth.user_id {
        return Err(AppError::forbidden(
            "Only the project owner can change bank details",
        ));
    }
    validate_bank_details(&input)?;

    let encrypted = state.config.bank_cipher.encrypt_bank_details(&input)?;
    let row = BankDetailRepo::upsert(&state.pool, id, &encrypted).await?;

    tracing::info!(project_id = id, "Bank details updated");
    state.publish(ChangeEvent::new("bank_details", ChangeAction::Update, row.id).with_project(id));

    Ok(Json(DataResponse {
        data: bank_details_view(id, input, false),
    }))
}

fn bank_details_view(project_id: DbId, details: BankDetails, masked: bool) -> BankDetailsView {
    let account_number = if masked {
        mask_account_number(&details.account_number)
    } else {
        details.account_number
    };
    BankDetailsView {
        project_id,
        account_name: details.account_name,
        account_number,
        bank_name: details.bank_name,
        masked,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_project(state: &AppState, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Project", id))
}

/// Load a project the viewer may see, answering 404 otherwise.
pub(crate) async fn find_visible_project(
    state: &AppState,
    id: DbId,
    viewer: Option<&AuthUser>,
) -> AppResult<Project> {
    let project = find_project(state, id).await?;
    let visible =
        project.status().is_public() || viewer.is_some_and(|v| v.can_manage(project.owner_id));
    if !visible {
        return Err(AppError::not_found("Project", id));
    }
    Ok(project)
}

async fn ensure_sector_exists(state: &AppState, sector_id: DbId) -> AppResult<()> {
    if SectorRepo::find_by_id(&state.pool, sector_id).await?.is_none() {
        return Err(AppError::validation(format!("Unknown sector {sector_id}")));
    }
    Ok(())
}

fn validate_deadline(deadline: Option<NaiveDate>) -> AppResult<()> {
    if deadline.is_some_and(|d| d < Utc::now().date_naive()) {
        return Err(AppError::validation("Deadline cannot be in the past"));
    }
    Ok(())
}

fn validate_bank_details(details: &BankDetails) -> AppResult<()> {
    if details.account_name.trim().is_empty() {
        return Err(AppError::validation("Account name is required"));
    }
    if details.bank_name.trim().is_empty() {
        return Err(AppError::validation("Bank name is required"));
    }
    validate_account_number(&details.account_number)?;
    Ok(())
}

/// Best effort: the project is already stored when this runs.
async fn notify_admins_of_submission(state: &AppState, project: &Project) {
    let admins = match UserRepo::list_admin_ids(&state.pool).await {
        Ok(admins) => admins,
        Err(e) => {
            tracing::warn!(project_id = project.id, error = %e, "Could not load admins to notify");
            return;
        }
    };
    let proposer = match UserRepo::find_by_id(&state.pool, project.owner_id).await {
        Ok(Some(user)) => user.full_name,
        Ok(None) => "A user".to_string(),
        Err(e) => {
            tracing::warn!(project_id = project.id, error = %e, "Could not load proposer name");
            "A user".to_string()
        }
    };

    let notice = Notice::new(
        KIND_PROJECT_SUBMITTED,
        "New project awaiting review",
        format!("{proposer} submitted \"{}\" for approval.", project.title),
    )
    .for_project(project.id)
    .with_email(EmailMessage::project_submitted(
        &project.title,
        &proposer,
        &state.config.project_link(project.id),
    ));

    let stored = state.notifier.notify_many(&admins, &notice).await;
    tracing::debug!(project_id = project.id, stored, "Admins notified of submission");
}
