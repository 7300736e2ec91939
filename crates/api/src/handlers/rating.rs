//! Handlers for project ratings (1 to 5 stars plus an optional review).
//!
//! Each user holds at most one rating per project; `PUT` creates or
//! replaces it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use aidlink_core::notification_kinds::{KIND_NEW_RATING, KIND_OWNER_REPLY};
use aidlink_core::types::DbId;
use aidlink_core::validation::{validate_comment, validate_rating};
use aidlink_db::models::rating::{Rating, RatingSummary, UpsertRating};
use aidlink_db::repositories::RatingRepo;
use aidlink_events::{ChangeAction, ChangeEvent};

use crate::error::{AppError, AppResult};
use crate::handlers::comment::ReplyRequest;
use crate::handlers::project::{find_project, find_visible_project};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::notifications::Notice;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub stars: i16,
    pub review: Option<String>,
}

/// Ratings page with the project's aggregate.
#[derive(Debug, Serialize)]
pub struct RatingList {
    pub summary: RatingSummary,
    pub ratings: Vec<Rating>,
}

/// GET /api/v1/projects/{id}/ratings
pub async fn list_ratings(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(project_id): Path<DbId>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<RatingList>>> {
    find_visible_project(&state, project_id, viewer.user()).await?;

    let (summary, ratings) = tokio::try_join!(
        RatingRepo::summary(&state.pool, project_id),
        RatingRepo::list_for_project(&state.pool, project_id, page.limit(), page.offset()),
    )?;
    Ok(Json(DataResponse {
        data: RatingList { summary, ratings },
    }))
}

/// PUT /api/v1/projects/{id}/ratings
///
/// Owners cannot rate their own project.
pub async fn upsert_rating(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<RatingRequest>,
) -> AppResult<Json<DataResponse<Rating>>> {
    validate_rating(input.stars)?;
    let review = input
        .review
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    if let Some(review) = &review {
        validate_comment(review)?;
    }

    let project = find_project(&state, project_id).await?;
    if !project.status().is_public() {
        return Err(AppError::conflict("This project is not open for ratings"));
    }
    if project.owner_id == auth.user_id {
        return Err(AppError::forbidden("You cannot rate your own project"));
    }

    let rating = RatingRepo::upsert(
        &state.pool,
        &UpsertRating {
            project_id,
            user_id: auth.user_id,
            stars: input.stars,
            review,
        },
    )
    .await?;

    // A fresh row has identical created/updated stamps.
    let action = if rating.created_at == rating.updated_at {
        ChangeAction::Insert
    } else {
        ChangeAction::Update
    };
    publish_rating(&state, &rating, action);

    let notice = Notice::new(
        KIND_NEW_RATING,
        "New rating",
        format!(
            "{} rated \"{}\" {} out of 5.",
            rating.author_name, project.title, rating.stars
        ),
    )
    .for_project(project_id);
    state.notifier.notify(project.owner_id, &notice).await;

    Ok(Json(DataResponse { data: rating }))
}

/// POST /api/v1/ratings/{id}/reply
pub async fn reply_rating(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ReplyRequest>,
) -> AppResult<Json<DataResponse<Rating>>> {
    validate_comment(&input.reply)?;

    let rating = find_rating(&state, id).await?;
    let project = find_project(&state, rating.project_id).await?;
    if project.owner_id != auth.user_id {
        return Err(AppError::forbidden("Only the project owner can reply"));
    }

    let rating = RatingRepo::reply(&state.pool, id, &input.reply)
        .await?
        .ok_or_else(|| AppError::not_found("Rating", id))?;
    publish_rating(&state, &rating, ChangeAction::Update);

    let notice = Notice::new(
        KIND_OWNER_REPLY,
        "The organizer replied",
        format!("The organizer of \"{}\" replied to your rating.", project.title),
    )
    .for_project(project.id);
    state.notifier.notify(rating.user_id, &notice).await;

    Ok(Json(DataResponse { data: rating }))
}

/// DELETE /api/v1/ratings/{id}
pub async fn delete_rating(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let rating = find_rating(&state, id).await?;
    if rating.user_id != auth.user_id && !auth.is_admin() {
        return Err(AppError::forbidden(
            "Only the author or an admin can delete this rating",
        ));
    }

    if !RatingRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Rating", id));
    }
    publish_rating(&state, &rating, ChangeAction::Delete);
    Ok(StatusCode::NO_CONTENT)
}

async fn find_rating(state: &AppState, id: DbId) -> AppResult<Rating> {
    RatingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Rating", id))
}

fn publish_rating(state: &AppState, rating: &Rating, action: ChangeAction) {
    state.publish(
        ChangeEvent::new("ratings", action, rating.id)
            .with_project(rating.project_id)
            .with_user(rating.user_id),
    );
}
