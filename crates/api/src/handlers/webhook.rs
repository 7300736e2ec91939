//! PayMongo webhook receiver.
//!
//! The signature is checked against the raw body before anything is
//! parsed. Deliveries for unknown intents and unhandled event types are
//! acknowledged so PayMongo stops retrying them.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use aidlink_core::status::FundStatus;
use aidlink_db::models::fund::SettleFund;
use aidlink_db::repositories::FundRepo;
use aidlink_paymongo::webhook::{
    verify_signature, WebhookEvent, EVENT_PAYMENT_FAILED, EVENT_PAYMENT_PAID, SIGNATURE_HEADER,
};

use crate::error::{AppError, AppResult};
use crate::payments;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    /// Whether the event changed a donation.
    pub applied: bool,
}

/// POST /api/v1/webhooks/paymongo
pub async fn paymongo_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<DataResponse<WebhookAck>>> {
    let Some(secret) = state.config.paymongo_webhook_secret.as_deref() else {
        tracing::warn!("Webhook received but PAYMONGO_WEBHOOK_SECRET is not set");
        return Err(AppError::unauthorized("Webhook signing secret is not configured"));
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing webhook signature"))?;

    verify_signature(signature, &body, secret, Utc::now()).map_err(|e| {
        tracing::warn!(error = %e, "Rejected webhook delivery");
        AppError::unauthorized("Invalid webhook signature")
    })?;

    let event = WebhookEvent::parse(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed webhook payload: {e}")))?;

    tracing::info!(event_id = event.id(), event_type = event.event_type(), "Webhook received");

    let status = match event.event_type() {
        EVENT_PAYMENT_PAID => FundStatus::Paid,
        EVENT_PAYMENT_FAILED => FundStatus::Failed,
        other => {
            tracing::debug!(event_type = other, "Ignoring webhook event");
            return Ok(ack(false));
        }
    };

    let Some(intent_id) = event.payment_intent_id() else {
        tracing::warn!(event_id = event.id(), "Payment event without a payment intent");
        return Ok(ack(false));
    };

    let Some(fund) = FundRepo::find_by_payment_intent(&state.pool, intent_id).await? else {
        tracing::warn!(payment_intent_id = intent_id, "Webhook for unknown payment intent");
        return Ok(ack(false));
    };

    let details = match status {
        FundStatus::Failed => SettleFund {
            payment_id: Some(event.payment_id().to_string()),
            failure_reason: Some(
                event
                    .failure_reason()
                    .unwrap_or_else(|| "Payment failed".to_string()),
            ),
        },
        _ => SettleFund {
            payment_id: Some(event.payment_id().to_string()),
            failure_reason: None,
        },
    };

    let applied = payments::settle(&state, &fund, status, details)
        .await?
        .is_some();
    Ok(ack(applied))
}

fn ack(applied: bool) -> Json<DataResponse<WebhookAck>> {
    Json(DataResponse {
        data: WebhookAck {
            received: true,
            applied,
        },
    })
}
