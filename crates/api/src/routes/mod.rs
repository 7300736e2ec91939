pub mod admin;
pub mod auth;
pub mod donation;
pub mod engagement;
pub mod health;
pub mod notification;
pub mod project;
pub mod sector;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                  WebSocket (optional ?token=)
///
/// /auth/*                              sign-up, sign-in, refresh, sign-out, me
/// /sectors                             public sector list
/// /projects/*                          projects, bank details, donations,
///                                      comments, ratings, updates
/// /donations/*                         mine, detail (re-sync), verify
/// /comments/{id}                       delete, reply
/// /ratings/{id}                        delete, reply
/// /updates/{id}                        delete
/// /notifications/*                     inbox
/// /dashboard                           personal dashboard
/// /admin/*                             users, sectors, moderation, donations,
///                                      dashboard (admin only)
/// /webhooks/paymongo                   PayMongo events (signed)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint.
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .nest("/sectors", sector::router())
        .nest("/projects", project::router())
        .nest("/donations", donation::router())
        .nest("/comments", engagement::comments_router())
        .nest("/ratings", engagement::ratings_router())
        .nest("/updates", engagement::updates_router())
        .nest("/notifications", notification::router())
        .route("/dashboard", get(handlers::dashboard::user_dashboard))
        .nest("/admin", admin::router())
        // Payment gateway callbacks.
        .route(
            "/webhooks/paymongo",
            post(handlers::webhook::paymongo_webhook),
        )
}
