//! Project comment model and DTOs.

use aidlink_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `comments` table joined with the author's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub author_name: String,
    pub body: String,
    /// The project owner's response, if any.
    pub reply: Option<String>,
    pub replied_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for posting a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub project_id: DbId,
    pub user_id: DbId,
    pub body: String,
}
