//! Route definitions for `/donations`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::donation;
use crate::state::AppState;

/// Routes mounted at `/donations`.
///
/// ```text
/// GET    /mine                    -> my_donations
/// GET    /{id}                    -> get_donation
/// POST   /{id}/verify             -> verify_donation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mine", get(donation::my_donations))
        .route("/{id}", get(donation::get_donation))
        .route("/{id}/verify", post(donation::verify_donation))
}
