//! Well-known notification kind constants.
//!
//! Stored in `notifications.kind` and used by clients to pick an icon and a
//! link target.

pub const KIND_PROJECT_SUBMITTED: &str = "project_submitted";
pub const KIND_PROJECT_APPROVED: &str = "project_approved";
pub const KIND_PROJECT_REJECTED: &str = "project_rejected";
pub const KIND_PROJECT_COMPLETED: &str = "project_completed";
pub const KIND_DONATION_RECEIVED: &str = "donation_received";
pub const KIND_DONATION_CONFIRMED: &str = "donation_confirmed";
pub const KIND_DONATION_FAILED: &str = "donation_failed";
pub const KIND_NEW_COMMENT: &str = "new_comment";
pub const KIND_NEW_RATING: &str = "new_rating";
pub const KIND_OWNER_REPLY: &str = "owner_reply";
pub const KIND_PROJECT_UPDATE: &str = "project_update";
