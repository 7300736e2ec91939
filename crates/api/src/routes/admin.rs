//! Route definitions for the `/admin` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{admin, dashboard, donation, moderation, sector};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /dashboard                -> admin_dashboard
///
/// GET    /users                    -> list_users
/// GET    /users/{id}               -> get_user
/// PUT    /users/{id}               -> update_user
/// DELETE /users/{id}               -> deactivate_user
///
/// POST   /sectors                  -> create_sector
/// PUT    /sectors/{id}             -> update_sector
/// DELETE /sectors/{id}             -> delete_sector
///
/// POST   /projects/{id}/approve    -> approve_project
/// POST   /projects/{id}/reject     -> reject_project
/// POST   /projects/{id}/complete   -> complete_project
///
/// GET    /donations                -> admin_list_donations
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::admin_dashboard))
        // User management
        .route("/users", get(admin::list_users))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::deactivate_user),
        )
        // Sectors
        .route("/sectors", post(sector::create_sector))
        .route(
            "/sectors/{id}",
            put(sector::update_sector).delete(sector::delete_sector),
        )
        // Project moderation
        .route("/projects/{id}/approve", post(moderation::approve_project))
        .route("/projects/{id}/reject", post(moderation::reject_project))
        .route("/projects/{id}/complete", post(moderation::complete_project))
        // Donations
        .route("/donations", get(donation::admin_list_donations))
}
