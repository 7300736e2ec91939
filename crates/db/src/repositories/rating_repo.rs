//! Repository for the `ratings` table.

use aidlink_core::types::DbId;
use sqlx::PgPool;

use crate::models::rating::{Rating, RatingSummary, UpsertRating};

/// Columns of a rating joined with its author (`r` and `u` aliases).
const COLUMNS: &str = "r.id, r.project_id, r.user_id, u.full_name AS author_name, r.stars, \
                        r.review, r.reply, r.replied_at, r.created_at, r.updated_at";

pub struct RatingRepo;

impl RatingRepo {
    /// Create the user's rating of a project or replace their earlier one.
    ///
    /// Changing a rating drops any owner reply to the old review.
    pub async fn upsert(pool: &PgPool, input: &UpsertRating) -> Result<Rating, sqlx::Error> {
        let query = format!(
            "WITH r AS (
                INSERT INTO ratings (project_id, user_id, stars, review)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT ON CONSTRAINT uq_ratings_project_user DO UPDATE SET
                    stars = EXCLUDED.stars,
                    review = EXCLUDED.review,
                    reply = NULL,
                    replied_at = NULL
                RETURNING *
             )
             SELECT {COLUMNS} FROM r JOIN users u ON u.id = r.user_id"
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(input.project_id)
            .bind(input.user_id)
            .bind(input.stars)
            .bind(input.review.as_deref().map(str::trim))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Rating>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ratings r JOIN users u ON u.id = r.user_id WHERE r.id = $1"
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Ratings of a project, most recently changed first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Rating>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ratings r JOIN users u ON u.id = r.user_id
             WHERE r.project_id = $1
             ORDER BY r.updated_at DESC, r.id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(project_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn reply(
        pool: &PgPool,
        id: DbId,
        reply: &str,
    ) -> Result<Option<Rating>, sqlx::Error> {
        let query = format!(
            "WITH r AS (
                UPDATE ratings SET reply = $2, replied_at = NOW()
                WHERE id = $1
                RETURNING *
             )
             SELECT {COLUMNS} FROM r JOIN users u ON u.id = r.user_id"
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(id)
            .bind(reply.trim())
            .fetch_optional(pool)
            .await
    }

    /// Average stars and number of ratings for a project.
    pub async fn summary(pool: &PgPool, project_id: DbId) -> Result<RatingSummary, sqlx::Error> {
        sqlx::query_as::<_, RatingSummary>(
            "SELECT AVG(stars)::FLOAT8 AS average, COUNT(*) AS count
             FROM ratings WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ratings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
