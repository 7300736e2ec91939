//! Handlers for donations (funds).
//!
//! Card and e-wallet donations run the PayMongo intent flow synchronously:
//! create intent, create method, attach, then branch on the attach result.
//! Bank transfers are recorded as pending and verified by the project owner
//! or an admin.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use aidlink_core::notification_kinds::KIND_DONATION_RECEIVED;
use aidlink_core::status::{FundStatus, PaymentMethodKind};
use aidlink_core::types::{Centavos, DbId};
use aidlink_core::validation::validate_donation_amount;
use aidlink_db::models::fund::{CreateFund, Fund, FundFilter, FundListItem, SettleFund};
use aidlink_db::models::project::Project;
use aidlink_db::repositories::{BankDetailRepo, FundRepo, UserRepo};
use aidlink_db::{clamp_limit, clamp_offset};
use aidlink_events::{ChangeAction, ChangeEvent, EmailMessage};
use aidlink_paymongo::{
    AttachPaymentIntent, Billing, CardDetails, CreatePaymentIntent, CreatePaymentMethod,
    PaymentOutcome,
};

use crate::error::{AppError, AppResult};
use crate::handlers::project::{find_project, find_visible_project};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::middleware::rbac::RequireAdmin;
use crate::notifications::Notice;
use crate::payments;
use crate::query::{PaginationParams, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest donor message kept with a donation.
const MESSAGE_MAX: usize = 500;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /projects/{id}/donations`.
#[derive(Debug, Deserialize)]
pub struct DonateRequest {
    /// Amount in centavos.
    pub amount: Centavos,
    pub payment_method: PaymentMethodKind,
    #[serde(default)]
    pub is_anonymous: bool,
    pub message: Option<String>,
    /// Required for card payments.
    pub card: Option<CardDetails>,
    /// Defaults to the donor's name and email.
    pub billing: Option<Billing>,
}

/// Body of `POST /projects/{id}/donations/bank-transfer`.
#[derive(Debug, Deserialize)]
pub struct BankTransferRequest {
    pub amount: Centavos,
    /// Reference printed on the transfer receipt.
    pub reference_number: String,
    /// Link to an uploaded receipt image.
    pub proof_url: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    pub message: Option<String>,
}

/// Body of `POST /donations/{id}/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// `paid` or `failed`.
    pub status: FundStatus,
    pub reason: Option<String>,
}

/// Result of starting an online donation.
#[derive(Debug, Serialize)]
pub struct DonationResponse {
    pub donation: Fund,
    /// Present when the donor must finish 3-D Secure or an e-wallet
    /// authorization in the browser.
    pub redirect_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Creating donations
// ---------------------------------------------------------------------------

/// POST /api/v1/projects/{id}/donations
///
/// Card or e-wallet donation. The fund is recorded `pending` first, so a
/// gateway failure at any step leaves a `failed` row behind rather than
/// nothing.
pub async fn donate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<DonateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<DonationResponse>>)> {
    let method = input.payment_method;
    if !method.is_online() {
        return Err(AppError::validation(
            "Bank transfers use the bank-transfer endpoint",
        ));
    }
    validate_donation_amount(input.amount, method)?;
    if method == PaymentMethodKind::Card && input.card.is_none() {
        return Err(AppError::validation("Card details are required"));
    }
    let message = clean_message(input.message)?;

    let project = find_project(&state, project_id).await?;
    ensure_accepts_donations(&project)?;

    let donor = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User", auth.user_id))?;

    let fund = FundRepo::create(
        &state.pool,
        &CreateFund {
            project_id,
            sector_id: project.sector_id,
            donor_id: auth.user_id,
            amount: input.amount,
            payment_method: method,
            is_anonymous: input.is_anonymous,
            message,
            reference_number: None,
            proof_url: None,
        },
    )
    .await?;
    tracing::info!(fund_id = fund.id, project_id, method = %method, amount = fund.amount, "Donation started");
    publish_fund(&state, &fund, ChangeAction::Insert);

    // 1. Intent
    let metadata = BTreeMap::from([
        ("fund_id".to_string(), fund.id.to_string()),
        ("project_id".to_string(), project_id.to_string()),
    ]);
    let intent = payments::fail_on_gateway_error(
        &state,
        &fund,
        state
            .paymongo
            .create_payment_intent(&CreatePaymentIntent {
                amount: fund.amount,
                description: format!("Donation to {}", project.title),
                payment_method_allowed: vec![method],
                metadata,
            })
            .await,
    )
    .await?;
    FundRepo::attach_intent(&state.pool, fund.id, &intent.id).await?;

    // 2. Method
    let billing = input.billing.unwrap_or_else(|| Billing {
        name: donor.full_name.clone(),
        email: donor.email.clone(),
        phone: donor.phone.clone(),
    });
    let payment_method = payments::fail_on_gateway_error(
        &state,
        &fund,
        state
            .paymongo
            .create_payment_method(&CreatePaymentMethod {
                method,
                card: input.card,
                billing: Some(billing),
            })
            .await,
    )
    .await?;

    // 3. Attach and branch
    let attached = payments::fail_on_gateway_error(
        &state,
        &fund,
        state
            .paymongo
            .attach_payment_intent(
                &intent.id,
                &AttachPaymentIntent {
                    payment_method: payment_method.id,
                    client_key: intent.attributes.client_key.clone(),
                    return_url: state.config.donation_return_url(fund.id),
                },
            )
            .await,
    )
    .await?;

    let redirect_url = match attached.outcome() {
        PaymentOutcome::Redirect { url } => {
            tracing::info!(fund_id = fund.id, "Donation awaiting customer authorization");
            Some(url)
        }
        _ => None,
    };
    payments::apply_intent(&state, &fund, &attached).await?;

    let donation = reload_fund(&state, fund.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: DonationResponse {
                donation,
                redirect_url,
            },
        }),
    ))
}

/// POST /api/v1/projects/{id}/donations/bank-transfer
///
/// Record a manual transfer to the project's bank account. The owner is
/// asked to verify it.
pub async fn donate_bank_transfer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<BankTransferRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Fund>>)> {
    validate_donation_amount(input.amount, PaymentMethodKind::BankTransfer)?;
    let reference_number = input.reference_number.trim();
    if reference_number.is_empty() {
        return Err(AppError::validation("Reference number is required"));
    }
    let message = clean_message(input.message)?;

    let project = find_project(&state, project_id).await?;
    ensure_accepts_donations(&project)?;
    if BankDetailRepo::find_by_project(&state.pool, project_id)
        .await?
        .is_none()
    {
        return Err(AppError::conflict(
            "This project does not accept bank transfers",
        ));
    }

    let fund = FundRepo::create(
        &state.pool,
        &CreateFund {
            project_id,
            sector_id: project.sector_id,
            donor_id: auth.user_id,
            amount: input.amount,
            payment_method: PaymentMethodKind::BankTransfer,
            is_anonymous: input.is_anonymous,
            message,
            reference_number: Some(reference_number.to_string()),
            proof_url: input.proof_url,
        },
    )
    .await?;

    tracing::info!(fund_id = fund.id, project_id, amount = fund.amount, "Bank transfer recorded");
    publish_fund(&state, &fund, ChangeAction::Insert);

    let amount = aidlink_core::money::format_php(fund.amount);
    let text = format!(
        "A bank transfer of {amount} (reference {reference_number}) to \"{}\" is awaiting your verification.",
        project.title
    );
    let notice = Notice::new(KIND_DONATION_RECEIVED, "Bank transfer to verify", text.clone())
        .for_project(project_id)
        .with_email(EmailMessage::plain("Bank transfer to verify", &text));
    state.notifier.notify(project.owner_id, &notice).await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: fund })))
}

// ---------------------------------------------------------------------------
// Reading donations
// ---------------------------------------------------------------------------

/// GET /api/v1/donations/{id}
///
/// Visible to the donor, the project owner and admins. A pending online
/// donation is re-synced from PayMongo first, which is how the return-URL
/// landing page learns the outcome of a redirect.
pub async fn get_donation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Fund>>> {
    let fund = reload_fund(&state, id).await?;
    if fund.donor_id != auth.user_id {
        let project = find_project(&state, fund.project_id).await?;
        if !auth.can_manage(project.owner_id) {
            return Err(AppError::forbidden("You cannot view this donation"));
        }
    }

    if fund.status() != FundStatus::Pending {
        return Ok(Json(DataResponse { data: fund }));
    }
    let Some(intent_id) = fund.payment_intent_id.as_deref() else {
        return Ok(Json(DataResponse { data: fund }));
    };

    match state.paymongo.retrieve_payment_intent(intent_id).await {
        Ok(intent) => {
            if payments::apply_intent(&state, &fund, &intent).await?.is_some() {
                let fund = reload_fund(&state, id).await?;
                return Ok(Json(DataResponse { data: fund }));
            }
        }
        Err(e) => {
            tracing::warn!(fund_id = id, error = %e, "Could not re-sync donation status");
        }
    }
    Ok(Json(DataResponse { data: fund }))
}

/// GET /api/v1/donations/mine
pub async fn my_donations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<FundListItem>>>> {
    let funds =
        FundRepo::list_for_donor(&state.pool, auth.user_id, page.limit(), page.offset()).await?;
    Ok(Json(DataResponse { data: funds }))
}

/// GET /api/v1/projects/{id}/donations
///
/// Paid donations to a project. Anonymous donors are hidden unless the
/// viewer owns the project or is an admin.
pub async fn project_donations(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(project_id): Path<DbId>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<FundListItem>>>> {
    let project = find_visible_project(&state, project_id, viewer.user()).await?;
    let hide_anonymous = !viewer.can_manage(project.owner_id);

    let funds = FundRepo::list_for_project(
        &state.pool,
        project_id,
        hide_anonymous,
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(DataResponse { data: funds }))
}

/// GET /api/v1/admin/donations
pub async fn admin_list_donations(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(filter): Query<FundFilter>,
) -> AppResult<Json<DataResponse<Vec<FundListItem>>>> {
    let limit = clamp_limit(filter.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(filter.offset);
    let funds = FundRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: funds }))
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// POST /api/v1/donations/{id}/verify
///
/// The project owner or an admin confirms (`paid`) or rejects (`failed`) a
/// bank transfer.
pub async fn verify_donation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<VerifyRequest>,
) -> AppResult<Json<DataResponse<Fund>>> {
    let fund = reload_fund(&state, id).await?;
    if fund.payment_method() != PaymentMethodKind::BankTransfer {
        return Err(AppError::validation(
            "Only bank transfers are verified manually",
        ));
    }

    let project = find_project(&state, fund.project_id).await?;
    if !auth.can_manage(project.owner_id) {
        return Err(AppError::forbidden(
            "Only the project owner or an admin can verify donations",
        ));
    }

    fund.status().ensure_transition(input.status)?;

    let failure_reason = match input.status {
        FundStatus::Failed => Some(
            input
                .reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| "Transfer could not be verified".to_string()),
        ),
        _ => None,
    };
    let details = SettleFund {
        payment_id: None,
        failure_reason,
    };

    let updated = payments::settle(&state, &fund, input.status, details)
        .await?
        .ok_or_else(|| AppError::conflict("Donation was settled by another request"))?;

    tracing::info!(fund_id = id, verifier = auth.user_id, status = %input.status, "Bank transfer verified");
    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn reload_fund(state: &AppState, id: DbId) -> AppResult<Fund> {
    FundRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Donation", id))
}

fn ensure_accepts_donations(project: &Project) -> AppResult<()> {
    if !project.status().accepts_donations() {
        return Err(AppError::conflict("This project is not accepting donations"));
    }
    Ok(())
}

fn clean_message(message: Option<String>) -> AppResult<Option<String>> {
    let message = message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());
    if message
        .as_deref()
        .is_some_and(|m| m.chars().count() > MESSAGE_MAX)
    {
        return Err(AppError::validation(format!(
            "Message must be at most {MESSAGE_MAX} characters"
        )));
    }
    Ok(message)
}

fn publish_fund(state: &AppState, fund: &Fund, action: ChangeAction) {
    state.publish(
        ChangeEvent::new("funds", action, fund.id)
            .with_project(fund.project_id)
            .with_user(fund.donor_id),
    );
}
