//! Response envelopes.
//!
//! Successful responses use `{ "data": ... }`; paginated listings add the
//! total row count and the effective page window.

use serde::Serialize;

/// Standard `{ "data": T }` envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": [...], "total", "limit", "offset" }` for paginated lists.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub data: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
