//! Repository for the `sectors` table.

use aidlink_core::types::DbId;
use sqlx::PgPool;

use crate::models::sector::{CreateSector, Sector, SectorWithCounts, UpdateSector};

const COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Provides CRUD operations for sectors.
pub struct SectorRepo;

impl SectorRepo {
    pub async fn create(pool: &PgPool, input: &CreateSector) -> Result<Sector, sqlx::Error> {
        let query = format!(
            "INSERT INTO sectors (name, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sector>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Sector>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sectors WHERE id = $1");
        sqlx::query_as::<_, Sector>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List sectors alphabetically with the number of public projects and
    /// the paid total raised in each.
    pub async fn list(pool: &PgPool) -> Result<Vec<SectorWithCounts>, sqlx::Error> {
        sqlx::query_as::<_, SectorWithCounts>(
            "SELECT s.id, s.name, s.description,
                    (SELECT COUNT(*) FROM projects p
                      WHERE p.sector_id = s.id
                        AND p.status IN ('approved', 'completed')) AS project_count,
                    COALESCE((SELECT SUM(f.amount) FROM funds f
                               WHERE f.sector_id = s.id AND f.status = 'paid'), 0)::BIGINT
                        AS total_raised,
                    s.created_at, s.updated_at
             FROM sectors s
             ORDER BY s.name",
        )
        .fetch_all(pool)
        .await
    }

    /// Update a sector. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSector,
    ) -> Result<Option<Sector>, sqlx::Error> {
        let query = format!(
            "UPDATE sectors SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sector>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a sector. Fails with a foreign key violation while projects
    /// still reference it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sectors WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM sectors")
            .fetch_one(pool)
            .await
    }
}
