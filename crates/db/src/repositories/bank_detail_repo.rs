//! Repository for the `bank_details` table.
//!
//! Values are stored exactly as given; encryption happens in the caller
//! with [`aidlink_core::crypto::BankCipher`].

use aidlink_core::crypto::EncryptedBankDetails;
use aidlink_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::bank_detail::BankDetailRow;

const COLUMNS: &str =
    "id, project_id, account_name, account_number, bank_name, created_at, updated_at";

pub struct BankDetailRepo;

impl BankDetailRepo {
    pub async fn find_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Option<BankDetailRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bank_details WHERE project_id = $1");
        sqlx::query_as::<_, BankDetailRow>(&query)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace the bank details of a project.
    pub async fn upsert(
        pool: &PgPool,
        project_id: DbId,
        details: &EncryptedBankDetails,
    ) -> Result<BankDetailRow, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::upsert_in(&mut conn, project_id, details).await
    }

    /// Same as [`upsert`](Self::upsert) on an existing connection or
    /// transaction.
    pub(crate) async fn upsert_in(
        conn: &mut PgConnection,
        project_id: DbId,
        details: &EncryptedBankDetails,
    ) -> Result<BankDetailRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO bank_details (project_id, account_name, account_number, bank_name)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_bank_details_project_id DO UPDATE SET
                account_name = EXCLUDED.account_name,
                account_number = EXCLUDED.account_number,
                bank_name = EXCLUDED.bank_name
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BankDetailRow>(&query)
            .bind(project_id)
            .bind(&details.account_name)
            .bind(&details.account_number)
            .bind(&details.bank_name)
            .fetch_one(conn)
            .await
    }
}
