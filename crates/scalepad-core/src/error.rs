//! Error taxonomy surfaced to callers of the client.
//!
//! Every failed call ends in exactly one [`ApiError`] variant, so calling code
//! can branch on the kind (and, for generic API errors, on the status code).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contract::ContractIssue;
use crate::http::TransportError;

/// One entry of the API's `{"errors": [...]}` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorItem {
    pub code: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorItem {
    pub fn new(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Failure of a client call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response other than 401 and 429.
    #[error("API error ({status}): {}", summarize(.errors))]
    Api { status: u16, errors: Vec<ErrorItem> },

    /// HTTP 401.
    #[error("authentication failed (401): {}", summarize(.errors))]
    Authentication { errors: Vec<ErrorItem> },

    /// HTTP 429. `retry_after` is the server's `Retry-After` in whole seconds.
    #[error("rate limit exceeded (429): {}", summarize(.errors))]
    RateLimit {
        errors: Vec<ErrorItem>,
        retry_after: Option<u64>,
    },

    /// The transport succeeded but the body failed the contract check.
    #[error("response validation failed: {message}")]
    ResponseValidation {
        message: String,
        issues: Vec<ContractIssue>,
    },

    /// Transport-level failure before a response was received.
    #[error("network request failed: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<TransportError>,
    },

    /// The attempt exceeded the configured request timeout.
    #[error("request timed out after {}ms", .timeout.as_millis())]
    Timeout { timeout: Duration },
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// HTTP status associated with the error, if it came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Authentication { .. } => Some(401),
            ApiError::RateLimit { .. } => Some(429),
            _ => None,
        }
    }

    /// Error items reported by the API (empty for non-HTTP failures).
    pub fn errors(&self) -> &[ErrorItem] {
        match self {
            ApiError::Api { errors, .. }
            | ApiError::Authentication { errors }
            | ApiError::RateLimit { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Server-mandated delay before the next attempt, for rate-limit errors.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ApiError::RateLimit {
                retry_after: Some(secs),
                ..
            } => Some(Duration::from_secs(*secs)),
            _ => None,
        }
    }

    pub(crate) fn network(message: impl Into<String>) -> Self {
        ApiError::Network {
            message: message.into(),
            source: None,
        }
    }
}

fn summarize(errors: &[ErrorItem]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.code, e.title))
        .collect::<Vec<_>>()
        .join("; ")
}
