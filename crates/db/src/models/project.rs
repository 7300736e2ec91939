//! Project entity model and DTOs.

use aidlink_core::status::ProjectStatus;
use aidlink_core::types::{Centavos, DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub owner_id: DbId,
    pub sector_id: DbId,
    pub title: String,
    pub description: String,
    /// Funding goal in centavos.
    pub target_amount: Centavos,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub approved_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Parsed status. The column is constrained by a `CHECK`, so an unknown
    /// value means the schema and code disagree; treat it as pending.
    pub fn status(&self) -> ProjectStatus {
        self.status.parse().unwrap_or(ProjectStatus::Pending)
    }
}

/// Project joined with owner/sector names and funding aggregates.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectDetail {
    pub id: DbId,
    pub owner_id: DbId,
    pub owner_name: String,
    pub sector_id: DbId,
    pub sector_name: String,
    pub title: String,
    pub description: String,
    pub target_amount: Centavos,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub approved_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    /// Sum of paid donations in centavos.
    pub raised_amount: Centavos,
    pub donor_count: i64,
    pub average_rating: Option<f64>,
    pub rating_count: i64,
    pub has_bank_details: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProjectDetail {
    pub fn status(&self) -> ProjectStatus {
        self.status.parse().unwrap_or(ProjectStatus::Pending)
    }
}

/// DTO for creating a new project. Status always starts as `pending`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub owner_id: DbId,
    pub sector_id: DbId,
    pub title: String,
    pub description: String,
    pub target_amount: Centavos,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub deadline: Option<NaiveDate>,
}

/// DTO for an owner edit. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub sector_id: Option<DbId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_amount: Option<Centavos>,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub deadline: Option<NaiveDate>,
}

/// Filters for project listing.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    /// Restrict to these statuses; empty means any.
    pub statuses: Vec<ProjectStatus>,
    pub sector_id: Option<DbId>,
    pub owner_id: Option<DbId>,
    /// Case-insensitive match against title and description.
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
