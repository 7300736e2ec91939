//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod bank_detail_repo;
pub mod comment_repo;
pub mod dashboard_repo;
pub mod fund_repo;
pub mod notification_repo;
pub mod project_repo;
pub mod project_update_repo;
pub mod rating_repo;
pub mod role_repo;
pub mod sector_repo;
pub mod session_repo;
pub mod user_repo;

pub use bank_detail_repo::BankDetailRepo;
pub use comment_repo::CommentRepo;
pub use dashboard_repo::DashboardRepo;
pub use fund_repo::FundRepo;
pub use notification_repo::NotificationRepo;
pub use project_repo::ProjectRepo;
pub use project_update_repo::ProjectUpdateRepo;
pub use rating_repo::RatingRepo;
pub use role_repo::RoleRepo;
pub use sector_repo::SectorRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
