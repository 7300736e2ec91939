//! Request and response payloads for the PayMongo v1 API.
//!
//! PayMongo wraps every resource as `{"data": {"id", "type", "attributes"}}`.
//! Response types keep that shape; request types are flattened and wrapped
//! by the client.

use std::collections::BTreeMap;
use std::fmt;

use aidlink_core::status::PaymentMethodKind;
use aidlink_core::types::Centavos;
use serde::{Deserialize, Serialize};

/// Payment intent status after a successful charge.
pub const STATUS_SUCCEEDED: &str = "succeeded";
/// The customer must complete 3-D Secure or an e-wallet authorization.
pub const STATUS_AWAITING_NEXT_ACTION: &str = "awaiting_next_action";
pub const STATUS_PROCESSING: &str = "processing";
/// Either freshly created or the last attached method failed.
pub const STATUS_AWAITING_PAYMENT_METHOD: &str = "awaiting_payment_method";

/// `{"data": ...}`
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Parameters for `POST /payment_intents`. The currency is always PHP.
#[derive(Debug, Clone)]
pub struct CreatePaymentIntent {
    pub amount: Centavos,
    pub description: String,
    pub payment_method_allowed: Vec<PaymentMethodKind>,
    /// Free-form string pairs echoed back in webhooks.
    pub metadata: BTreeMap<String, String>,
}

/// Raw card details. Never logged.
#[derive(Clone, Deserialize)]
pub struct CardDetails {
    pub card_number: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvc: String,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last4: String = self
            .card_number
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        f.debug_struct("CardDetails")
            .field("card_number", &format!("****{last4}"))
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Billing {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Parameters for `POST /payment_methods`.
#[derive(Debug, Clone)]
pub struct CreatePaymentMethod {
    /// Card or one of the e-wallets. Bank transfers never reach PayMongo.
    pub method: PaymentMethodKind,
    /// Required when `method` is [`PaymentMethodKind::Card`].
    pub card: Option<CardDetails>,
    pub billing: Option<Billing>,
}

/// Parameters for `POST /payment_intents/{id}/attach`.
#[derive(Debug, Clone)]
pub struct AttachPaymentIntent {
    pub payment_method: String,
    pub client_key: String,
    /// Where PayMongo sends the customer after a redirect step.
    pub return_url: String,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// A payment intent resource.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub attributes: PaymentIntentAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntentAttributes {
    pub amount: Centavos,
    pub currency: String,
    pub status: String,
    pub client_key: String,
    pub description: Option<String>,
    pub next_action: Option<NextAction>,
    pub last_payment_error: Option<LastPaymentError>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NextAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub redirect: Option<Redirect>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Redirect {
    pub url: String,
    pub return_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastPaymentError {
    pub failed_code: Option<String>,
    pub failed_message: Option<String>,
}

/// A payment embedded in a payment intent.
#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    pub id: String,
    pub attributes: PaymentAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentAttributes {
    pub status: String,
    pub amount: Option<Centavos>,
}

/// A payment method resource.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    pub attributes: PaymentMethodAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethodAttributes {
    #[serde(rename = "type")]
    pub kind: String,
}

/// What the caller should do next with a payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The charge went through.
    Succeeded,
    /// Send the customer to `url` (3-D Secure or e-wallet authorization).
    Redirect { url: String },
    /// Not settled yet: still processing, or no method attached so far.
    Processing,
    /// The attached method was declined or the intent is unusable.
    Failed { reason: String },
}

impl PaymentIntent {
    pub fn status(&self) -> &str {
        &self.attributes.status
    }

    /// Branch on the intent status after attaching a payment method.
    pub fn outcome(&self) -> PaymentOutcome {
        match self.status() {
            STATUS_SUCCEEDED => PaymentOutcome::Succeeded,
            STATUS_AWAITING_NEXT_ACTION => match self.redirect_url() {
                Some(url) => PaymentOutcome::Redirect {
                    url: url.to_string(),
                },
                None => PaymentOutcome::Processing,
            },
            STATUS_PROCESSING => PaymentOutcome::Processing,
            // A fresh intent sits here too; only a recorded error is a decline.
            STATUS_AWAITING_PAYMENT_METHOD => match self.failure_reason() {
                Some(reason) => PaymentOutcome::Failed { reason },
                None => PaymentOutcome::Processing,
            },
            other => PaymentOutcome::Failed {
                reason: format!("Unexpected payment status '{other}'"),
            },
        }
    }

    pub fn redirect_url(&self) -> Option<&str> {
        self.attributes
            .next_action
            .as_ref()
            .and_then(|a| a.redirect.as_ref())
            .map(|r| r.url.as_str())
    }

    /// ID of the most recent payment made against this intent.
    pub fn payment_id(&self) -> Option<&str> {
        self.attributes.payments.last().map(|p| p.id.as_str())
    }

    pub fn failure_reason(&self) -> Option<String> {
        let err = self.attributes.last_payment_error.as_ref()?;
        err.failed_message.clone().or_else(|| err.failed_code.clone())
    }
}
