//! REST client for the PayMongo payment intent workflow.
//!
//! The donation flow is three calls: create an intent, create a payment
//! method, attach the method to the intent. The attach response decides the
//! branch (see [`PaymentIntent::outcome`]). No call is retried.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::PaymongoError;
use crate::types::{
    AttachPaymentIntent, CreatePaymentIntent, CreatePaymentMethod, Envelope, PaymentIntent,
    PaymentMethod,
};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.paymongo.com/v1";
/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Connection settings for the PayMongo API.
#[derive(Clone)]
pub struct PaymongoConfig {
    /// Secret API key (`sk_test_...` or `sk_live_...`).
    pub secret_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for PaymongoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymongoConfig")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl PaymongoConfig {
    pub fn new(secret_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var               | Required | Default                        |
    /// |-----------------------|----------|--------------------------------|
    /// | `PAYMONGO_SECRET_KEY` | **yes**  | --                             |
    /// | `PAYMONGO_BASE_URL`   | no       | `https://api.paymongo.com/v1`  |
    ///
    /// # Panics
    ///
    /// Panics if `PAYMONGO_SECRET_KEY` is not set or is empty.
    pub fn from_env() -> Self {
        let secret_key = std::env::var("PAYMONGO_SECRET_KEY")
            .expect("PAYMONGO_SECRET_KEY must be set in the environment");
        assert!(!secret_key.is_empty(), "PAYMONGO_SECRET_KEY must not be empty");

        let base_url =
            std::env::var("PAYMONGO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Self::new(secret_key, base_url)
    }
}

/// HTTP client for the PayMongo API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PaymongoClient {
    http: reqwest::Client,
    config: PaymongoConfig,
}

impl PaymongoClient {
    pub fn new(config: PaymongoConfig) -> Result<Self, PaymongoError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// `POST /payment_intents`
    pub async fn create_payment_intent(
        &self,
        input: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, PaymongoError> {
        let allowed: Vec<&str> = input
            .payment_method_allowed
            .iter()
            .map(|m| m.as_str())
            .collect();
        let body = json!({
            "data": {
                "attributes": {
                    "amount": input.amount,
                    "currency": "PHP",
                    "capture_type": "automatic",
                    "payment_method_allowed": allowed,
                    "payment_method_options": {
                        "card": { "request_three_d_secure": "any" }
                    },
                    "description": input.description,
                    "metadata": input.metadata,
                }
            }
        });

        tracing::debug!(amount = input.amount, "Creating payment intent");
        self.post("/payment_intents", &body).await
    }

    /// `POST /payment_methods`
    pub async fn create_payment_method(
        &self,
        input: &CreatePaymentMethod,
    ) -> Result<PaymentMethod, PaymongoError> {
        let mut attributes = json!({ "type": input.method.as_str() });
        if let Some(card) = &input.card {
            attributes["details"] = json!({
                "card_number": card.card_number,
                "exp_month": card.exp_month,
                "exp_year": card.exp_year,
                "cvc": card.cvc,
            });
        }
        if let Some(billing) = &input.billing {
            attributes["billing"] = json!(billing);
        }
        let body = json!({ "data": { "attributes": attributes } });

        tracing::debug!(method = %input.method, "Creating payment method");
        self.post("/payment_methods", &body).await
    }

    /// `POST /payment_intents/{id}/attach`
    pub async fn attach_payment_intent(
        &self,
        intent_id: &str,
        input: &AttachPaymentIntent,
    ) -> Result<PaymentIntent, PaymongoError> {
        let body = json!({
            "data": {
                "attributes": {
                    "payment_method": input.payment_method,
                    "client_key": input.client_key,
                    "return_url": input.return_url,
                }
            }
        });

        tracing::debug!(intent_id, "Attaching payment method");
        self.post(&format!("/payment_intents/{intent_id}/attach"), &body)
            .await
    }

    /// `GET /payment_intents/{id}`
    pub async fn retrieve_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, PaymongoError> {
        let response = self
            .http
            .get(self.url(&format!("/payment_intents/{intent_id}")))
            .basic_auth(&self.config.secret_key, None::<&str>)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, PaymongoError> {
        let response = self
            .http
            .post(self.url(path))
            .basic_auth(&self.config.secret_key, None::<&str>)
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Map non-2xx responses to [`PaymongoError::Api`] and unwrap the
    /// `{"data": ...}` envelope of successful ones.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PaymongoError> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let err = PaymongoError::from_body(status.as_u16(), &text);
            tracing::warn!(status = status.as_u16(), error = %err, "PayMongo request rejected");
            return Err(err);
        }
        let envelope: Envelope<T> = serde_json::from_str(&text)?;
        Ok(envelope.data)
    }
}
