//! Repository for the `projects` table.

use aidlink_core::crypto::EncryptedBankDetails;
use aidlink_core::status::ProjectStatus;
use aidlink_core::types::DbId;
use sqlx::PgPool;

use crate::contains_pattern;
use crate::models::dashboard::ProjectStatusCounts;
use crate::models::project::{CreateProject, Project, ProjectDetail, ProjectFilter, UpdateProject};
use crate::repositories::BankDetailRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, sector_id, title, description, target_amount, image_url, \
                        location, deadline, status, rejection_reason, approved_at, completed_at, \
                        created_at, updated_at";

/// Select list and joins for [`ProjectDetail`]. Aggregates only count paid
/// donations.
const DETAIL_SELECT: &str = "SELECT p.id, p.owner_id, u.full_name AS owner_name, \
        p.sector_id, s.name AS sector_name, p.title, p.description, p.target_amount, \
        p.image_url, p.location, p.deadline, p.status, p.rejection_reason, \
        p.approved_at, p.completed_at, \
        COALESCE(f.raised, 0)::BIGINT AS raised_amount, \
        COALESCE(f.donors, 0) AS donor_count, \
        r.average AS average_rating, \
        COALESCE(r.total, 0) AS rating_count, \
        EXISTS (SELECT 1 FROM bank_details b WHERE b.project_id = p.id) AS has_bank_details, \
        p.created_at, p.updated_at \
    FROM projects p \
    JOIN users u ON u.id = p.owner_id \
    JOIN sectors s ON s.id = p.sector_id \
    LEFT JOIN LATERAL ( \
        SELECT SUM(amount) AS raised, COUNT(DISTINCT donor_id) AS donors \
        FROM funds WHERE project_id = p.id AND status = 'paid' \
    ) f ON true \
    LEFT JOIN LATERAL ( \
        SELECT AVG(stars)::FLOAT8 AS average, COUNT(*) AS total \
        FROM ratings WHERE project_id = p.id \
    ) r ON true";

/// Shared WHERE clause for [`ProjectRepo::list`] and [`ProjectRepo::count`].
const FILTER_WHERE: &str = "WHERE (cardinality($1::text[]) = 0 OR p.status = ANY($1)) \
      AND ($2::bigint IS NULL OR p.sector_id = $2) \
      AND ($3::bigint IS NULL OR p.owner_id = $3) \
      AND ($4::text IS NULL \
           OR p.title ILIKE $4 ESCAPE '\\' \
           OR p.description ILIKE $4 ESCAPE '\\')";

/// Provides CRUD and moderation operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new pending project, together with its encrypted bank
    /// details when given. Both rows are written in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProject,
        bank_details: Option<&EncryptedBankDetails>,
    ) -> Result<Project, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO projects
                (owner_id, sector_id, title, description, target_amount, image_url, location, deadline)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(input.owner_id)
            .bind(input.sector_id)
            .bind(input.title.trim())
            .bind(input.description.trim())
            .bind(input.target_amount)
            .bind(&input.image_url)
            .bind(&input.location)
            .bind(input.deadline)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(details) = bank_details {
            BankDetailRepo::upsert_in(&mut *tx, project.id, details).await?;
        }

        tx.commit().await?;
        Ok(project)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a project with owner and sector names and funding aggregates.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProjectDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE p.id = $1");
        sqlx::query_as::<_, ProjectDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List projects matching `filter`, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &ProjectFilter,
    ) -> Result<Vec<ProjectDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT} {FILTER_WHERE}
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, ProjectDetail>(&query)
            .bind(status_strings(&filter.statuses))
            .bind(filter.sector_id)
            .bind(filter.owner_id)
            .bind(filter.search.as_deref().map(contains_pattern))
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of projects matching `filter`, ignoring pagination.
    pub async fn count(pool: &PgPool, filter: &ProjectFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM projects p {FILTER_WHERE}");
        sqlx::query_scalar(&query)
            .bind(status_strings(&filter.statuses))
            .bind(filter.sector_id)
            .bind(filter.owner_id)
            .bind(filter.search.as_deref().map(contains_pattern))
            .fetch_one(pool)
            .await
    }

    /// Apply an owner edit. Only non-`None` fields are applied.
    ///
    /// Editing a rejected project resubmits it: the status returns to
    /// `pending` and the rejection reason is cleared. Returns `None` if the
    /// project does not exist or is no longer editable.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                sector_id = COALESCE($2, sector_id),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                target_amount = COALESCE($5, target_amount),
                image_url = COALESCE($6, image_url),
                location = COALESCE($7, location),
                deadline = COALESCE($8, deadline),
                status = 'pending',
                rejection_reason = NULL
             WHERE id = $1 AND status IN ('pending', 'rejected')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(input.sector_id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(input.description.as_deref().map(str::trim))
            .bind(input.target_amount)
            .bind(&input.image_url)
            .bind(&input.location)
            .bind(input.deadline)
            .fetch_optional(pool)
            .await
    }

    /// Move a project from `from` to `to`, stamping `approved_at` or
    /// `completed_at` as appropriate. `rejection_reason` is kept only for
    /// `rejected`.
    ///
    /// Returns `None` when the project is not currently in `from`, so two
    /// concurrent moderators cannot both apply a transition.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        from: ProjectStatus,
        to: ProjectStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                status = $3,
                rejection_reason = CASE WHEN $3 = 'rejected' THEN $4::text ELSE NULL END,
                approved_at = CASE WHEN $3 = 'approved' THEN NOW() ELSE approved_at END,
                completed_at = CASE WHEN $3 = 'completed' THEN NOW() ELSE completed_at END
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(rejection_reason)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project. Bank details and engagement rows cascade; a project
    /// with any donation is refused by the `funds` foreign key.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count projects per status, optionally for a single owner.
    pub async fn count_by_status(
        pool: &PgPool,
        owner_id: Option<DbId>,
    ) -> Result<ProjectStatusCounts, sqlx::Error> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM projects
             WHERE ($1::bigint IS NULL OR owner_id = $1)
             GROUP BY status",
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        let mut counts = ProjectStatusCounts::default();
        for (status, count) in rows {
            match status.parse::<ProjectStatus>() {
                Ok(ProjectStatus::Pending) => counts.pending = count,
                Ok(ProjectStatus::Approved) => counts.approved = count,
                Ok(ProjectStatus::Rejected) => counts.rejected = count,
                Ok(ProjectStatus::Completed) => counts.completed = count,
                Err(_) => tracing::warn!(status = %status, "Unknown project status in counts"),
            }
        }
        Ok(counts)
    }
}

fn status_strings(statuses: &[ProjectStatus]) -> Vec<&'static str> {
    statuses.iter().map(|s| s.as_str()).collect()
}
