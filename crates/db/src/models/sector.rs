//! Sector (project category) model and DTOs.

use aidlink_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `sectors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sector {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A sector with the number of public projects filed under it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SectorWithCounts {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub project_count: i64,
    pub total_raised: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a sector.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSector {
    pub name: String,
    pub description: Option<String>,
}

/// DTO for updating a sector. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSector {
    pub name: Option<String>,
    pub description: Option<String>,
}
