//! PayMongo webhook verification and event parsing.
//!
//! Each delivery carries a `Paymongo-Signature` header of the form
//! `t=<unix seconds>,te=<test signature>,li=<live signature>`. The signature
//! is HMAC-SHA256 over `"{t}.{raw body}"` keyed with the webhook secret,
//! hex encoded. Only one of `te` / `li` is populated.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

/// Name of the signature header.
pub const SIGNATURE_HEADER: &str = "paymongo-signature";

/// Deliveries older (or further in the future) than this are rejected.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

pub const EVENT_PAYMENT_PAID: &str = "payment.paid";
pub const EVENT_PAYMENT_FAILED: &str = "payment.failed";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Malformed signature header")]
    MalformedHeader,

    #[error("Signature timestamp is outside the allowed window")]
    Expired,

    #[error("Signature does not match")]
    Mismatch,
}

/// Parsed `Paymongo-Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SignatureHeader<'a> {
    timestamp: i64,
    test: Option<&'a str>,
    live: Option<&'a str>,
}

fn parse_header(header: &str) -> Result<SignatureHeader<'_>, WebhookError> {
    let mut timestamp = None;
    let mut test = None;
    let mut live = None;

    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or(WebhookError::MalformedHeader)?;
        let value = value.trim();
        match key {
            "t" => {
                timestamp = Some(value.parse().map_err(|_| WebhookError::MalformedHeader)?);
            }
            "te" if !value.is_empty() => test = Some(value),
            "li" if !value.is_empty() => live = Some(value),
            _ => {}
        }
    }

    Ok(SignatureHeader {
        timestamp: timestamp.ok_or(WebhookError::MalformedHeader)?,
        test,
        live,
    })
}

/// Verify a webhook delivery against the shared secret.
///
/// The live signature is checked first, then the test one; either matching
/// is accepted. Comparison is constant-time.
pub fn verify_signature(
    header: &str,
    body: &[u8],
    secret: &str,
    now: DateTime<Utc>,
) -> Result<(), WebhookError> {
    let parsed = parse_header(header)?;

    if (now.timestamp() - parsed.timestamp).abs() > TIMESTAMP_TOLERANCE_SECS {
        return Err(WebhookError::Expired);
    }

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| WebhookError::Mismatch)?;
    mac.update(parsed.timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);

    for candidate in [parsed.live, parsed.test].into_iter().flatten() {
        let Ok(expected) = hex::decode(candidate) else {
            continue;
        };
        if mac.clone().verify_slice(&expected).is_ok() {
            return Ok(());
        }
    }
    Err(WebhookError::Mismatch)
}

/// Compute the signature PayMongo would send for `body` at `timestamp`.
/// Useful for tests and local tooling.
pub fn sign(body: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

// ---------------------------------------------------------------------------
// Event payload
// ---------------------------------------------------------------------------

/// A webhook event: `{"data": {"id", "attributes": {"type", "livemode", "data"}}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub id: String,
    pub attributes: EventAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventAttributes {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub livemode: bool,
    /// The resource the event is about (a payment for `payment.*` events).
    pub data: EventResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventResource {
    pub id: String,
    #[serde(default)]
    pub attributes: EventResourceAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventResourceAttributes {
    pub payment_intent_id: Option<String>,
    pub status: Option<String>,
    pub amount: Option<i64>,
    pub failed_code: Option<String>,
    pub failed_message: Option<String>,
}

impl WebhookEvent {
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }

    /// Event type, e.g. `payment.paid`.
    pub fn event_type(&self) -> &str {
        &self.data.attributes.kind
    }

    pub fn payment_intent_id(&self) -> Option<&str> {
        self.data.attributes.data.attributes.payment_intent_id.as_deref()
    }

    /// ID of the payment resource the event describes.
    pub fn payment_id(&self) -> &str {
        &self.data.attributes.data.id
    }

    pub fn failure_reason(&self) -> Option<String> {
        let attrs = &self.data.attributes.data.attributes;
        attrs.failed_message.clone().or_else(|| attrs.failed_code.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const SECRET: &str = "whsk_test_secret";
    const BODY: &[u8] = br#"{"data":{"id":"evt_1"}}"#;

    fn at(ts: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(ts, 0).unwrap()
    }

    #[test]
    fn valid_test_signature_passes() {
        let sig = sign(BODY, SECRET, 1_700_000_000);
        let header = format!("t=1700000000,te={sig},li=");
        assert_eq!(verify_signature(&header, BODY, SECRET, at(1_700_000_010)), Ok(()));
    }

    #[test]
    fn valid_live_signature_passes() {
        let sig = sign(BODY, SECRET, 1_700_000_000);
        let header = format!("t=1700000000,te=,li={sig}");
        assert_eq!(verify_signature(&header, BODY, SECRET, at(1_700_000_000)), Ok(()));
    }

    #[test]
    fn tampered_body_fails() {
        let sig = sign(BODY, SECRET, 1_700_000_000);
        let header = format!("t=1700000000,te={sig},li=");
        assert_eq!(
            verify_signature(&header, b"{}", SECRET, at(1_700_000_000)),
            Err(WebhookError::Mismatch)
        );
    }

    #[test]
    fn wrong_secret_fails() {
        let sig = sign(BODY, "whsk_other", 1_700_000_000);
        let header = format!("t=1700000000,te={sig},li=");
        assert_eq!(
            verify_signature(&header, BODY, SECRET, at(1_700_000_000)),
            Err(WebhookError::Mismatch)
        );
    }

    #[test]
    fn old_timestamp_is_rejected() {
        let sig = sign(BODY, SECRET, 1_700_000_000);
        let header = format!("t=1700000000,te={sig},li=");
        assert_eq!(
            verify_signature(&header, BODY, SECRET, at(1_700_000_000 + TIMESTAMP_TOLERANCE_SECS + 1)),
            Err(WebhookError::Expired)
        );
    }

    #[test]
    fn malformed_headers() {
        for header in ["", "te=abc", "t=notanumber,te=abc", "garbage"] {
            assert_eq!(
                verify_signature(header, BODY, SECRET, at(0)),
                Err(WebhookError::MalformedHeader),
                "header {header:?}"
            );
        }
    }

    #[test]
    fn parses_payment_paid_event() {
        let body = br#"{
            "data": {
                "id": "evt_123",
                "type": "event",
                "attributes": {
                    "type": "payment.paid",
                    "livemode": false,
                    "data": {
                        "id": "pay_456",
                        "type": "payment",
                        "attributes": {"amount": 10000, "status": "paid", "payment_intent_id": "pi_789"}
                    }
                }
            }
        }"#;
        let event = WebhookEvent::parse(body).unwrap();
        assert_eq!(event.id(), "evt_123");
        assert_eq!(event.event_type(), EVENT_PAYMENT_PAID);
        assert_eq!(event.payment_intent_id(), Some("pi_789"));
        assert_eq!(event.payment_id(), "pay_456");
        assert!(event.failure_reason().is_none());
    }

    #[test]
    fn failed_event_reason() {
        let body = br#"{"data":{"id":"evt_1","attributes":{"type":"payment.failed","data":{
            "id":"pay_1","attributes":{"payment_intent_id":"pi_1","failed_code":"insufficient_funds"}}}}}"#;
        let event = WebhookEvent::parse(body).unwrap();
        assert_eq!(event.event_type(), EVENT_PAYMENT_FAILED);
        assert_eq!(event.failure_reason().as_deref(), Some("insufficient_funds"));
    }
}
