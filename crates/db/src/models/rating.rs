//! Project rating model and DTOs.

use aidlink_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `ratings` table joined with the rater's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Rating {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub author_name: String,
    pub stars: i16,
    pub review: Option<String>,
    pub reply: Option<String>,
    pub replied_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Average and count of a project's ratings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: i64,
}

/// DTO for creating or replacing the caller's rating of a project.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertRating {
    pub project_id: DbId,
    pub user_id: DbId,
    pub stars: i16,
    pub review: Option<String>,
}
