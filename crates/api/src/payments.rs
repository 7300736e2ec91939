//! Donation settlement shared by the donation handlers, the status re-sync
//! and the PayMongo webhook.
//!
//! A fund settles at most once: [`FundRepo::set_status`] only moves a
//! pending row, so whichever path (attach response, return-URL re-sync,
//! webhook) gets there first wins and later ones become no-ops.

use aidlink_core::notification_kinds::{
    KIND_DONATION_CONFIRMED, KIND_DONATION_FAILED, KIND_DONATION_RECEIVED,
};
use aidlink_core::status::FundStatus;
use aidlink_db::models::fund::{Fund, SettleFund};
use aidlink_db::repositories::{FundRepo, ProjectRepo, UserRepo};
use aidlink_events::{ChangeAction, ChangeEvent, EmailMessage};
use aidlink_paymongo::{PaymentIntent, PaymentOutcome, PaymongoError};

use crate::error::AppResult;
use crate::notifications::Notice;
use crate::state::AppState;

/// Move a pending fund to `paid` or `failed`, then publish the change and
/// notify the project owner and the donor.
///
/// Returns the updated fund, or `None` if it had already settled.
pub async fn settle(
    state: &AppState,
    fund: &Fund,
    status: FundStatus,
    details: SettleFund,
) -> AppResult<Option<Fund>> {
    let Some(updated) = FundRepo::set_status(&state.pool, fund.id, status, &details).await? else {
        tracing::debug!(fund_id = fund.id, status = %status, "Donation already settled");
        return Ok(None);
    };

    tracing::info!(
        fund_id = updated.id,
        project_id = updated.project_id,
        status = %status,
        amount = updated.amount,
        "Donation settled"
    );

    state.publish(
        ChangeEvent::new("funds", ChangeAction::Update, updated.id)
            .with_project(updated.project_id)
            .with_user(updated.donor_id),
    );

    notify_settlement(state, &updated, status).await;
    Ok(Some(updated))
}

/// Best effort: the fund has already settled, so lookup failures are
/// logged and the settlement still stands.
async fn notify_settlement(state: &AppState, fund: &Fund, status: FundStatus) {
    let project = match ProjectRepo::find_by_id(&state.pool, fund.project_id).await {
        Ok(Some(project)) => project,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(fund_id = fund.id, error = %e, "Could not load project for settlement notice");
            return;
        }
    };
    let amount = aidlink_core::money::format_php(fund.amount);

    match status {
        FundStatus::Paid => {
            let donor_name = if fund.is_anonymous {
                None
            } else {
                match UserRepo::find_by_id(&state.pool, fund.donor_id).await {
                    Ok(user) => user.map(|u| u.full_name),
                    Err(e) => {
                        tracing::warn!(fund_id = fund.id, error = %e, "Could not load donor name");
                        None
                    }
                }
            };
            let from = donor_name.as_deref().unwrap_or("An anonymous donor");

            let owner_notice = Notice::new(
                KIND_DONATION_RECEIVED,
                "New donation received",
                format!("{from} donated {amount} to \"{}\".", project.title),
            )
            .for_project(project.id)
            .with_email(EmailMessage::donation_received(
                &project.title,
                fund.amount,
                donor_name.as_deref(),
            ));
            state.notifier.notify(project.owner_id, &owner_notice).await;

            let donor_notice = Notice::new(
                KIND_DONATION_CONFIRMED,
                "Donation confirmed",
                format!("Your donation of {amount} to \"{}\" was received.", project.title),
            )
            .for_project(project.id)
            .with_email(EmailMessage::donation_confirmed(&project.title, fund.amount));
            state.notifier.notify(fund.donor_id, &donor_notice).await;
        }
        FundStatus::Failed => {
            let reason = fund
                .failure_reason
                .as_deref()
                .unwrap_or("The payment was not completed");
            let message = format!(
                "Your donation of {amount} to \"{}\" did not go through: {reason}",
                project.title
            );
            let notice = Notice::new(KIND_DONATION_FAILED, "Donation failed", message.clone())
                .for_project(project.id)
                .with_email(EmailMessage::plain("Donation failed", &message));
            state.notifier.notify(fund.donor_id, &notice).await;
        }
        FundStatus::Pending => {}
    }
}

/// Apply a payment intent's state to its fund. `Redirect` and `Processing`
/// leave the fund pending.
pub async fn apply_intent(
    state: &AppState,
    fund: &Fund,
    intent: &PaymentIntent,
) -> AppResult<Option<Fund>> {
    match intent.outcome() {
        PaymentOutcome::Succeeded => {
            let details = SettleFund {
                payment_id: intent.payment_id().map(str::to_string),
                failure_reason: None,
            };
            settle(state, fund, FundStatus::Paid, details).await
        }
        PaymentOutcome::Failed { reason } => {
            let details = SettleFund {
                payment_id: intent.payment_id().map(str::to_string),
                failure_reason: Some(reason),
            };
            settle(state, fund, FundStatus::Failed, details).await
        }
        PaymentOutcome::Redirect { .. } | PaymentOutcome::Processing => Ok(None),
    }
}

/// Mark a fund failed after a gateway call error, then hand the error back
/// so the handler can return it.
pub async fn fail_on_gateway_error<T>(
    state: &AppState,
    fund: &Fund,
    result: Result<T, PaymongoError>,
) -> AppResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => {
            let reason = match &err {
                PaymongoError::Api { detail, .. } => detail.clone(),
                other => other.to_string(),
            };
            let details = SettleFund {
                payment_id: None,
                failure_reason: Some(reason),
            };
            settle(state, fund, FundStatus::Failed, details).await?;
            Err(err.into())
        }
    }
}
