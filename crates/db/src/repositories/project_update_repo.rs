//! Repository for the `project_updates` table.

use aidlink_core::types::DbId;
use sqlx::PgPool;

use crate::models::project_update::{CreateProjectUpdate, ProjectUpdate};

const COLUMNS: &str = "id, project_id, author_id, title, body, image_url, created_at";

pub struct ProjectUpdateRepo;

impl ProjectUpdateRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateProjectUpdate,
    ) -> Result<ProjectUpdate, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_updates (project_id, author_id, title, body, image_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectUpdate>(&query)
            .bind(input.project_id)
            .bind(input.author_id)
            .bind(input.title.trim())
            .bind(input.body.trim())
            .bind(&input.image_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProjectUpdate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM project_updates WHERE id = $1");
        sqlx::query_as::<_, ProjectUpdate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Updates posted on a project, newest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProjectUpdate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_updates
             WHERE project_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ProjectUpdate>(&query)
            .bind(project_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_updates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
