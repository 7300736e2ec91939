//! Form validation rules shared by the API handlers.
//!
//! Every check returns [`CoreError::Validation`] with a message that can be
//! shown to the user as-is.

use validator::ValidateEmail;

use crate::error::CoreError;
use crate::status::PaymentMethodKind;
use crate::types::Centavos;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

pub const SECTOR_NAME_MIN: usize = 3;
pub const SECTOR_NAME_MAX: usize = 100;

pub const PROJECT_TITLE_MIN: usize = 5;
pub const PROJECT_TITLE_MAX: usize = 150;
pub const PROJECT_DESCRIPTION_MIN: usize = 20;

/// Smallest funding target a proposal may ask for (100.00 PHP).
pub const PROJECT_TARGET_MIN: Centavos = 10_000;
/// Largest funding target a proposal may ask for (10,000,000.00 PHP).
pub const PROJECT_TARGET_MAX: Centavos = 1_000_000_000;

/// Gateway minimum for card and e-wallet payments (100.00 PHP).
pub const ONLINE_DONATION_MIN: Centavos = 10_000;
/// Minimum for a manual bank transfer (1.00 PHP).
pub const BANK_TRANSFER_MIN: Centavos = 100;
/// Upper bound for a single donation (1,000,000.00 PHP).
pub const DONATION_MAX: Centavos = 100_000_000;

pub const COMMENT_MAX: usize = 1000;
pub const UPDATE_TITLE_MIN: usize = 3;
pub const UPDATE_TITLE_MAX: usize = 150;
pub const RATING_MIN: i16 = 1;
pub const RATING_MAX: i16 = 5;
pub const PASSWORD_MIN: usize = 8;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn check_length(field: &str, value: &str, min: usize, max: Option<usize>) -> Result<(), CoreError> {
    let len = value.trim().chars().count();
    if len < min {
        return Err(CoreError::Validation(format!(
            "{field} must be at least {min} characters"
        )));
    }
    if let Some(max) = max {
        if len > max {
            return Err(CoreError::Validation(format!(
                "{field} must be at most {max} characters"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

pub fn validate_sector_name(name: &str) -> Result<(), CoreError> {
    check_length("Sector name", name, SECTOR_NAME_MIN, Some(SECTOR_NAME_MAX))
}

pub fn validate_project_title(title: &str) -> Result<(), CoreError> {
    check_length("Title", title, PROJECT_TITLE_MIN, Some(PROJECT_TITLE_MAX))
}

pub fn validate_project_description(description: &str) -> Result<(), CoreError> {
    check_length("Description", description, PROJECT_DESCRIPTION_MIN, None)
}

pub fn validate_target_amount(amount: Centavos) -> Result<(), CoreError> {
    if !(PROJECT_TARGET_MIN..=PROJECT_TARGET_MAX).contains(&amount) {
        return Err(CoreError::Validation(format!(
            "Target amount must be between {} and {}",
            crate::money::format_php(PROJECT_TARGET_MIN),
            crate::money::format_php(PROJECT_TARGET_MAX),
        )));
    }
    Ok(())
}

/// Donation amounts depend on the channel: the gateway enforces its own
/// minimum for card and e-wallet payments.
pub fn validate_donation_amount(
    amount: Centavos,
    method: PaymentMethodKind,
) -> Result<(), CoreError> {
    let min = if method.is_online() {
        ONLINE_DONATION_MIN
    } else {
        BANK_TRANSFER_MIN
    };
    if amount < min {
        return Err(CoreError::Validation(format!(
            "Minimum donation is {}",
            crate::money::format_php(min)
        )));
    }
    if amount > DONATION_MAX {
        return Err(CoreError::Validation(format!(
            "Maximum donation is {}",
            crate::money::format_php(DONATION_MAX)
        )));
    }
    Ok(())
}

pub fn validate_rating(stars: i16) -> Result<(), CoreError> {
    if !(RATING_MIN..=RATING_MAX).contains(&stars) {
        return Err(CoreError::Validation(format!(
            "Rating must be between {RATING_MIN} and {RATING_MAX}"
        )));
    }
    Ok(())
}

pub fn validate_comment(body: &str) -> Result<(), CoreError> {
    check_length("Comment", body, 1, Some(COMMENT_MAX))
}

pub fn validate_update(title: &str, body: &str) -> Result<(), CoreError> {
    check_length("Update title", title, UPDATE_TITLE_MIN, Some(UPDATE_TITLE_MAX))?;
    check_length("Update content", body, 1, None)
}

pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if !email.validate_email() {
        return Err(CoreError::Validation("Invalid email address".to_string()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < PASSWORD_MIN {
        return Err(CoreError::Validation(format!(
            "Password must be at least {PASSWORD_MIN} characters long"
        )));
    }
    Ok(())
}

/// Bank account numbers are digits, optionally grouped with spaces or dashes.
pub fn validate_account_number(number: &str) -> Result<(), CoreError> {
    let digits: String = number.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    if digits.len() < 6 || digits.len() > 20 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::Validation(
            "Account number must contain 6 to 20 digits".to_string(),
        ));
    }
    Ok(())
}
