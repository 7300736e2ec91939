//! Route definitions for the `/projects` resource and everything scoped
//! to a single project.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{comment, donation, project, project_update, rating};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                              -> list_projects (public)
/// POST   /                              -> create_project
/// GET    /mine                          -> my_projects
/// GET    /{id}                          -> get_project
/// PUT    /{id}                          -> update_project
/// DELETE /{id}                          -> delete_project
///
/// GET    /{id}/bank-details             -> get_bank_details
/// PUT    /{id}/bank-details             -> put_bank_details
///
/// GET    /{id}/donations                -> project_donations
/// POST   /{id}/donations                -> donate
/// POST   /{id}/donations/bank-transfer  -> donate_bank_transfer
///
/// GET    /{id}/comments                 -> list_comments
/// POST   /{id}/comments                 -> create_comment
/// GET    /{id}/ratings                  -> list_ratings
/// PUT    /{id}/ratings                  -> upsert_rating
/// GET    /{id}/updates                  -> list_updates
/// POST   /{id}/updates                  -> create_update
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(project::list_projects).post(project::create_project),
        )
        .route("/mine", get(project::my_projects))
        .route(
            "/{id}",
            get(project::get_project)
                .put(project::update_project)
                .delete(project::delete_project),
        )
        .route(
            "/{id}/bank-details",
            get(project::get_bank_details).put(project::put_bank_details),
        )
        // Donations
        .route(
            "/{id}/donations",
            get(donation::project_donations).post(donation::donate),
        )
        .route(
            "/{id}/donations/bank-transfer",
            post(donation::donate_bank_transfer),
        )
        // Engagement
        .route(
            "/{id}/comments",
            get(comment::list_comments).post(comment::create_comment),
        )
        .route(
            "/{id}/ratings",
            get(rating::list_ratings).put(rating::upsert_rating),
        )
        .route(
            "/{id}/updates",
            get(project_update::list_updates).post(project_update::create_update),
        )
}
