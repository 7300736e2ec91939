//! Route definitions for the public `/sectors` listing.
//!
//! Sector mutations live under `/admin/sectors`.

use axum::routing::get;
use axum::Router;

use crate::handlers::sector;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(sector::list_sectors))
}
