//! Notification entity model and DTOs.

use aidlink_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    /// One of the `aidlink_core::notification_kinds` constants.
    pub kind: String,
    pub title: String,
    pub message: String,
    pub project_id: Option<DbId>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub emailed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a notification.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotification {
    pub user_id: DbId,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub project_id: Option<DbId>,
}
