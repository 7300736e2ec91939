//! Encrypted bank detail rows.
//!
//! The three account fields are stored encrypted; see
//! [`aidlink_core::crypto::BankCipher`].

use aidlink_core::crypto::EncryptedBankDetails;
use aidlink_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `bank_details` table. Never serialized directly.
#[derive(Debug, Clone, FromRow)]
pub struct BankDetailRow {
    pub id: DbId,
    pub project_id: DbId,
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BankDetailRow {
    pub fn encrypted(&self) -> EncryptedBankDetails {
        EncryptedBankDetails {
            account_name: self.account_name.clone(),
            account_number: self.account_number.clone(),
            bank_name: self.bank_name.clone(),
        }
    }
}
