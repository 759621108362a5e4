//! Error classification and retry with backoff.
//!
//! Non-2xx responses and transport failures are classified into the
//! [`ApiError`](crate::error::ApiError) taxonomy here; the same module decides
//! which of those are worth another attempt and how long to wait first, so the
//! request executor and any caller-side loops share one policy.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_http_status, classify_transport_error, parse_retry_after};
pub use policy::{
    backoff_delay, ErrorKind, RetryDecision, RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY,
    DEFAULT_MAX_RETRIES,
};
pub use run::run_with_retry;
