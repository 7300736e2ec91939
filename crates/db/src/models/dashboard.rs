//! Aggregate figures for the admin and user dashboards.

use aidlink_core::types::Centavos;
use serde::Serialize;

/// Number of projects in each status.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectStatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub completed: i64,
}

/// Number of donations in each status.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FundStatusCounts {
    pub pending: i64,
    pub paid: i64,
    pub failed: i64,
}

/// Platform-wide totals for administrators.
#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_sectors: i64,
    pub projects: ProjectStatusCounts,
    pub donations: FundStatusCounts,
    pub total_raised: Centavos,
}

/// Personal totals for a signed-in user.
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub projects: ProjectStatusCounts,
    /// Paid donations received by the user's projects.
    pub total_raised: Centavos,
    /// Paid donations the user has made.
    pub total_donated: Centavos,
    pub donation_count: i64,
    pub unread_notifications: i64,
}
