//! Project progress update model and DTOs.

use aidlink_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `project_updates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectUpdate {
    pub id: DbId,
    pub project_id: DbId,
    pub author_id: DbId,
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for posting an update.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectUpdate {
    pub project_id: DbId,
    pub author_id: DbId,
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
}
