//! Repository for the `comments` table.

use aidlink_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::{Comment, CreateComment};

/// Columns of a comment joined with its author (`c` and `u` aliases).
const COLUMNS: &str = "c.id, c.project_id, c.user_id, u.full_name AS author_name, c.body, \
                        c.reply, c.replied_at, c.created_at, c.updated_at";

pub struct CommentRepo;

impl CommentRepo {
    pub async fn create(pool: &PgPool, input: &CreateComment) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "WITH c AS (
                INSERT INTO comments (project_id, user_id, body)
                VALUES ($1, $2, $3)
                RETURNING *
             )
             SELECT {COLUMNS} FROM c JOIN users u ON u.id = c.user_id"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(input.project_id)
            .bind(input.user_id)
            .bind(input.body.trim())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments c JOIN users u ON u.id = c.user_id WHERE c.id = $1"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Comments on a project, oldest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments c JOIN users u ON u.id = c.user_id
             WHERE c.project_id = $1
             ORDER BY c.created_at, c.id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(project_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Set (or replace) the project owner's reply.
    pub async fn reply(
        pool: &PgPool,
        id: DbId,
        reply: &str,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!(
            "WITH c AS (
                UPDATE comments SET reply = $2, replied_at = NOW()
                WHERE id = $1
                RETURNING *
             )
             SELECT {COLUMNS} FROM c JOIN users u ON u.id = c.user_id"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(reply.trim())
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
