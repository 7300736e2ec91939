//! Routes addressing comments, ratings and updates by their own id.
//! Project-scoped listing and creation live in [`super::project`].

use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::{comment, project_update, rating};
use crate::state::AppState;

/// Routes mounted at `/comments`.
pub fn comments_router() -> Router<AppState> {
    Router::new()
        .route("/{id}", delete(comment::delete_comment))
        .route("/{id}/reply", post(comment::reply_comment))
}

/// Routes mounted at `/ratings`.
pub fn ratings_router() -> Router<AppState> {
    Router::new()
        .route("/{id}", delete(rating::delete_rating))
        .route("/{id}/reply", post(rating::reply_rating))
}

/// Routes mounted at `/updates`.
pub fn updates_router() -> Router<AppState> {
    Router::new().route("/{id}", delete(project_update::delete_update))
}
