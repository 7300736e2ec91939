//! Fund (donation) model and DTOs.

use aidlink_core::status::{FundStatus, PaymentMethodKind};
use aidlink_core::types::{Centavos, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `funds` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Fund {
    pub id: DbId,
    pub project_id: DbId,
    pub sector_id: DbId,
    pub donor_id: DbId,
    /// Donation amount in centavos.
    pub amount: Centavos,
    pub payment_method: String,
    pub status: String,
    pub is_anonymous: bool,
    pub message: Option<String>,
    pub payment_intent_id: Option<String>,
    pub payment_id: Option<String>,
    pub reference_number: Option<String>,
    pub proof_url: Option<String>,
    pub failure_reason: Option<String>,
    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Fund {
    pub fn status(&self) -> FundStatus {
        self.status.parse().unwrap_or(FundStatus::Pending)
    }

    pub fn payment_method(&self) -> PaymentMethodKind {
        self.payment_method
            .parse()
            .unwrap_or(PaymentMethodKind::BankTransfer)
    }
}

/// A fund joined with project title and donor name for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FundListItem {
    pub id: DbId,
    pub project_id: DbId,
    pub project_title: String,
    pub sector_id: DbId,
    /// `donor_id` and `donor_name` are `None` when the donor chose to stay
    /// anonymous and the listing hides anonymous donors.
    pub donor_id: Option<DbId>,
    pub donor_name: Option<String>,
    pub amount: Centavos,
    pub payment_method: String,
    pub status: String,
    pub is_anonymous: bool,
    pub message: Option<String>,
    pub reference_number: Option<String>,
    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for recording a new donation. Status always starts as `pending`.
#[derive(Debug, Clone)]
pub struct CreateFund {
    pub project_id: DbId,
    pub sector_id: DbId,
    pub donor_id: DbId,
    pub amount: Centavos,
    pub payment_method: PaymentMethodKind,
    pub is_anonymous: bool,
    pub message: Option<String>,
    pub reference_number: Option<String>,
    pub proof_url: Option<String>,
}

/// Settlement details written when a fund leaves `pending`.
#[derive(Debug, Clone, Default)]
pub struct SettleFund {
    pub payment_id: Option<String>,
    pub failure_reason: Option<String>,
}

/// Filters for the admin donation listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FundFilter {
    pub status: Option<FundStatus>,
    pub payment_method: Option<PaymentMethodKind>,
    pub project_id: Option<DbId>,
    pub sector_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
