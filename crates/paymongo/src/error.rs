//! Errors from the PayMongo REST API layer.

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum PaymongoError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("PayMongo request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// PayMongo returned a non-2xx status code.
    #[error("PayMongo API error ({status}): {detail}")]
    Api {
        status: u16,
        /// Error code of the first reported error, e.g. `parameter_below_minimum`.
        code: Option<String>,
        /// Human-readable detail of the first reported error, or the raw body.
        detail: String,
    },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Unexpected PayMongo response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// `{"errors": [{"code": "...", "detail": "..."}]}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEntry {
    pub code: Option<String>,
    pub detail: Option<String>,
}

impl PaymongoError {
    /// Build an [`Api`](Self::Api) error from a status code and raw body.
    pub(crate) fn from_body(status: u16, body: &str) -> Self {
        let first = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.errors.into_iter().next());

        match first {
            Some(entry) => Self::Api {
                status,
                detail: entry
                    .detail
                    .or_else(|| entry.code.clone())
                    .unwrap_or_else(|| "Unknown error".to_string()),
                code: entry.code,
            },
            None => Self::Api {
                status,
                code: None,
                detail: if body.is_empty() {
                    "<empty body>".to_string()
                } else {
                    body.to_string()
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn first_error_detail_is_used() {
        let body = r#"{"errors":[
            {"code":"parameter_below_minimum","detail":"amount cannot be less than 100."},
            {"code":"other","detail":"ignored"}
        ]}"#;
        assert_matches!(
            PaymongoError::from_body(400, body),
            PaymongoError::Api { status: 400, code: Some(code), detail }
                if code == "parameter_below_minimum" && detail == "amount cannot be less than 100."
        );
    }

    #[test]
    fn non_json_body_is_kept_raw() {
        assert_matches!(
            PaymongoError::from_body(502, "Bad Gateway"),
            PaymongoError::Api { status: 502, code: None, detail } if detail == "Bad Gateway"
        );
    }
}
