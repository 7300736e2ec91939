//! AidLink domain core.
//!
//! Shared types, domain errors, status lifecycles, validation rules and the
//! bank-detail cipher. This crate has no internal dependencies so the
//! repository layer, the payment client and the API can all use it.

pub mod crypto;
pub mod error;
pub mod money;
pub mod notification_kinds;
pub mod roles;
pub mod status;
pub mod types;
pub mod validation;
