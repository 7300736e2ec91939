//! PayMongo payment gateway client.
//!
//! Provides:
//! - [`client`] -- REST client for payment intents and payment methods.
//! - [`types`] -- request/response payloads and [`PaymentOutcome`] branching.
//! - [`webhook`] -- `Paymongo-Signature` verification and event parsing.

pub mod client;
pub mod error;
pub mod types;
pub mod webhook;

pub use client::{PaymongoClient, PaymongoConfig};
pub use error::PaymongoError;
pub use types::{
    AttachPaymentIntent, Billing, CardDetails, CreatePaymentIntent, CreatePaymentMethod,
    PaymentIntent, PaymentMethod, PaymentOutcome,
};
