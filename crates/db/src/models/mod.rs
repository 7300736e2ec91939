//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod bank_detail;
pub mod comment;
pub mod dashboard;
pub mod fund;
pub mod notification;
pub mod project;
pub mod project_update;
pub mod rating;
pub mod role;
pub mod sector;
pub mod session;
pub mod user;
