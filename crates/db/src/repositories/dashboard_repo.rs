//! Aggregate queries behind the dashboards.

use aidlink_core::types::{Centavos, DbId};
use sqlx::PgPool;

use crate::models::dashboard::{AdminStats, UserStats};
use crate::repositories::{FundRepo, NotificationRepo, ProjectRepo, SectorRepo, UserRepo};

pub struct DashboardRepo;

impl DashboardRepo {
    /// Platform-wide figures. The independent queries run concurrently.
    pub async fn admin_stats(pool: &PgPool) -> Result<AdminStats, sqlx::Error> {
        let (total_users, total_sectors, projects, donations, total_raised) = tokio::try_join!(
            UserRepo::count(pool),
            SectorRepo::count(pool),
            ProjectRepo::count_by_status(pool, None),
            FundRepo::count_by_status(pool),
            FundRepo::total_paid(pool, None),
        )?;

        Ok(AdminStats {
            total_users,
            total_sectors,
            projects,
            donations,
            total_raised,
        })
    }

    /// Figures for one user's own dashboard.
    pub async fn user_stats(pool: &PgPool, user_id: DbId) -> Result<UserStats, sqlx::Error> {
        let (projects, total_raised, (total_donated, donation_count), unread_notifications) = tokio::try_join!(
            ProjectRepo::count_by_status(pool, Some(user_id)),
            Self::raised_by_owner(pool, user_id),
            Self::donated_by(pool, user_id),
            NotificationRepo::unread_count(pool, user_id),
        )?;

        Ok(UserStats {
            projects,
            total_raised,
            total_donated,
            donation_count,
            unread_notifications,
        })
    }

    async fn raised_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Centavos, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(f.amount), 0)::BIGINT
             FROM funds f JOIN projects p ON p.id = f.project_id
             WHERE p.owner_id = $1 AND f.status = 'paid'",
        )
        .bind(owner_id)
        .fetch_one(pool)
        .await
    }

    async fn donated_by(pool: &PgPool, donor_id: DbId) -> Result<(Centavos, i64), sqlx::Error> {
        sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT, COUNT(*)
             FROM funds WHERE donor_id = $1 AND status = 'paid'",
        )
        .bind(donor_id)
        .fetch_one(pool)
        .await
    }
}
