//! Repository for the `funds` (donations) table.

use aidlink_core::status::FundStatus;
use aidlink_core::types::{Centavos, DbId};
use sqlx::PgPool;

use crate::models::dashboard::FundStatusCounts;
use crate::models::fund::{CreateFund, Fund, FundFilter, FundListItem, SettleFund};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, sector_id, donor_id, amount, payment_method, status, \
                        is_anonymous, message, payment_intent_id, payment_id, reference_number, \
                        proof_url, failure_reason, paid_at, created_at, updated_at";

/// Select list for [`FundListItem`]. `$1` is a boolean: when true the donor
/// of an anonymous donation is hidden.
const LIST_SELECT: &str = "SELECT f.id, f.project_id, p.title AS project_title, f.sector_id, \
        CASE WHEN f.is_anonymous AND $1 THEN NULL ELSE f.donor_id END AS donor_id, \
        CASE WHEN f.is_anonymous AND $1 THEN NULL ELSE u.full_name END AS donor_name, \
        f.amount, f.payment_method, f.status, f.is_anonymous, f.message, \
        f.reference_number, f.paid_at, f.created_at \
    FROM funds f \
    JOIN projects p ON p.id = f.project_id \
    JOIN users u ON u.id = f.donor_id";

/// Provides CRUD and settlement operations for donations.
pub struct FundRepo;

impl FundRepo {
    /// Record a new pending donation.
    pub async fn create(pool: &PgPool, input: &CreateFund) -> Result<Fund, sqlx::Error> {
        let query = format!(
            "INSERT INTO funds
                (project_id, sector_id, donor_id, amount, payment_method, is_anonymous,
                 message, reference_number, proof_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Fund>(&query)
            .bind(input.project_id)
            .bind(input.sector_id)
            .bind(input.donor_id)
            .bind(input.amount)
            .bind(input.payment_method.as_str())
            .bind(input.is_anonymous)
            .bind(&input.message)
            .bind(&input.reference_number)
            .bind(&input.proof_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Fund>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM funds WHERE id = $1");
        sqlx::query_as::<_, Fund>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the donation paid through a PayMongo payment intent.
    pub async fn find_by_payment_intent(
        pool: &PgPool,
        payment_intent_id: &str,
    ) -> Result<Option<Fund>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM funds WHERE payment_intent_id = $1");
        sqlx::query_as::<_, Fund>(&query)
            .bind(payment_intent_id)
            .fetch_optional(pool)
            .await
    }

    /// Link a pending donation to the payment intent created for it.
    pub async fn attach_intent(
        pool: &PgPool,
        id: DbId,
        payment_intent_id: &str,
    ) -> Result<Option<Fund>, sqlx::Error> {
        let query = format!(
            "UPDATE funds SET payment_intent_id = $2
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Fund>(&query)
            .bind(id)
            .bind(payment_intent_id)
            .fetch_optional(pool)
            .await
    }

    /// Settle a pending donation as `paid` or `failed`.
    ///
    /// Returns `None` when the donation is missing or has already settled,
    /// which makes repeated webhook deliveries harmless.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: FundStatus,
        settle: &SettleFund,
    ) -> Result<Option<Fund>, sqlx::Error> {
        let query = format!(
            "UPDATE funds SET
                status = $2,
                payment_id = COALESCE($3, payment_id),
                failure_reason = CASE WHEN $2 = 'failed' THEN $4::text ELSE NULL END,
                paid_at = CASE WHEN $2 = 'paid' THEN NOW() ELSE NULL END
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Fund>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(&settle.payment_id)
            .bind(&settle.failure_reason)
            .fetch_optional(pool)
            .await
    }

    /// Paid donations to a project, newest first.
    ///
    /// With `hide_anonymous`, donors who asked to stay anonymous are
    /// returned without their ID and name.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
        hide_anonymous: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FundListItem>, sqlx::Error> {
        let query = format!(
            "{LIST_SELECT}
             WHERE f.project_id = $2 AND f.status = 'paid'
             ORDER BY f.paid_at DESC NULLS LAST, f.id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, FundListItem>(&query)
            .bind(hide_anonymous)
            .bind(project_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// All donations made by a donor, in any status, newest first.
    pub async fn list_for_donor(
        pool: &PgPool,
        donor_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FundListItem>, sqlx::Error> {
        let query = format!(
            "{LIST_SELECT}
             WHERE f.donor_id = $2
             ORDER BY f.created_at DESC, f.id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, FundListItem>(&query)
            .bind(false)
            .bind(donor_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Admin listing across all donations.
    pub async fn list(
        pool: &PgPool,
        filter: &FundFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FundListItem>, sqlx::Error> {
        let query = format!(
            "{LIST_SELECT}
             WHERE ($2::text IS NULL OR f.status = $2)
               AND ($3::text IS NULL OR f.payment_method = $3)
               AND ($4::bigint IS NULL OR f.project_id = $4)
               AND ($5::bigint IS NULL OR f.sector_id = $5)
             ORDER BY f.created_at DESC, f.id DESC
             LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, FundListItem>(&query)
            .bind(false)
            .bind(filter.status.map(FundStatus::as_str))
            .bind(filter.payment_method.map(|m| m.as_str()))
            .bind(filter.project_id)
            .bind(filter.sector_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Distinct donors with at least one paid donation to the project.
    pub async fn distinct_donor_ids(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT donor_id FROM funds
             WHERE project_id = $1 AND status = 'paid'
             ORDER BY donor_id",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Sum of paid donations, for one project or platform-wide.
    pub async fn total_paid(
        pool: &PgPool,
        project_id: Option<DbId>,
    ) -> Result<Centavos, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM funds
             WHERE status = 'paid' AND ($1::bigint IS NULL OR project_id = $1)",
        )
        .bind(project_id)
        .fetch_one(pool)
        .await
    }

    pub async fn count_by_status(pool: &PgPool) -> Result<FundStatusCounts, sqlx::Error> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM funds GROUP BY status")
                .fetch_all(pool)
                .await?;

        let mut counts = FundStatusCounts::default();
        for (status, count) in rows {
            match status.parse::<FundStatus>() {
                Ok(FundStatus::Pending) => counts.pending = count,
                Ok(FundStatus::Paid) => counts.paid = count,
                Ok(FundStatus::Failed) => counts.failed = count,
                Err(_) => tracing::warn!(status = %status, "Unknown fund status in counts"),
            }
        }
        Ok(counts)
    }
}
