//! Handlers for project comments and owner replies.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use aidlink_core::notification_kinds::{KIND_NEW_COMMENT, KIND_OWNER_REPLY};
use aidlink_core::types::DbId;
use aidlink_core::validation::validate_comment;
use aidlink_db::models::comment::{Comment, CreateComment};
use aidlink_db::repositories::CommentRepo;
use aidlink_events::{ChangeAction, ChangeEvent};

use crate::error::{AppError, AppResult};
use crate::handlers::project::{find_project, find_visible_project};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::notifications::Notice;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub reply: String,
}

/// GET /api/v1/projects/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(project_id): Path<DbId>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Comment>>>> {
    find_visible_project(&state, project_id, viewer.user()).await?;
    let comments =
        CommentRepo::list_for_project(&state.pool, project_id, page.limit(), page.offset())
            .await?;
    Ok(Json(DataResponse { data: comments }))
}

/// POST /api/v1/projects/{id}/comments
///
/// Only live projects take comments. The owner is notified unless they
/// commented themselves.
pub async fn create_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CommentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Comment>>)> {
    validate_comment(&input.body)?;

    let project = find_project(&state, project_id).await?;
    if !project.status().is_public() {
        return Err(AppError::conflict("This project is not open for comments"));
    }

    let comment = CommentRepo::create(
        &state.pool,
        &CreateComment {
            project_id,
            user_id: auth.user_id,
            body: input.body,
        },
    )
    .await?;

    publish_comment(&state, &comment, ChangeAction::Insert);

    if project.owner_id != auth.user_id {
        let notice = Notice::new(
            KIND_NEW_COMMENT,
            "New comment",
            format!("{} commented on \"{}\".", comment.author_name, project.title),
        )
        .for_project(project_id);
        state.notifier.notify(project.owner_id, &notice).await;
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// POST /api/v1/comments/{id}/reply
///
/// The project owner answers a comment. Replying again replaces the
/// earlier reply.
pub async fn reply_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ReplyRequest>,
) -> AppResult<Json<DataResponse<Comment>>> {
    validate_comment(&input.reply)?;

    let comment = find_comment(&state, id).await?;
    let project = find_project(&state, comment.project_id).await?;
    if project.owner_id != auth.user_id {
        return Err(AppError::forbidden("Only the project owner can reply"));
    }

    let comment = CommentRepo::reply(&state.pool, id, &input.reply)
        .await?
        .ok_or_else(|| AppError::not_found("Comment", id))?;
    publish_comment(&state, &comment, ChangeAction::Update);

    if comment.user_id != auth.user_id {
        let notice = Notice::new(
            KIND_OWNER_REPLY,
            "The organizer replied",
            format!("The organizer of \"{}\" replied to your comment.", project.title),
        )
        .for_project(project.id);
        state.notifier.notify(comment.user_id, &notice).await;
    }

    Ok(Json(DataResponse { data: comment }))
}

/// DELETE /api/v1/comments/{id}
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let comment = find_comment(&state, id).await?;
    if comment.user_id != auth.user_id && !auth.is_admin() {
        return Err(AppError::forbidden(
            "Only the author or an admin can delete this comment",
        ));
    }

    if !CommentRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Comment", id));
    }
    publish_comment(&state, &comment, ChangeAction::Delete);
    Ok(StatusCode::NO_CONTENT)
}

async fn find_comment(state: &AppState, id: DbId) -> AppResult<Comment> {
    CommentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Comment", id))
}

fn publish_comment(state: &AppState, comment: &Comment, action: ChangeAction) {
    state.publish(
        ChangeEvent::new("comments", action, comment.id)
            .with_project(comment.project_id)
            .with_user(comment.user_id),
    );
}
