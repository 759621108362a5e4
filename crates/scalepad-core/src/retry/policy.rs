use std::time::Duration;

use rand::Rng;

use crate::config::{RetryConfig, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_DELAY_MS};

pub use crate::config::DEFAULT_MAX_RETRIES;

/// Default base delay for exponential backoff.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(DEFAULT_BASE_DELAY_MS);
/// Default cap on the exponential part of the backoff.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(DEFAULT_MAX_DELAY_MS);

/// Share of the capped backoff added on top as random jitter.
const JITTER_RATIO: f64 = 0.3;

/// High-level classification of a failure for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Attempt exceeded the request timeout.
    Timeout,
    /// HTTP 429, with the server's `Retry-After` seconds if it sent one.
    Throttled { retry_after: Option<u64> },
    /// Transport failure before a response (refused, DNS, reset, aborted).
    Connection,
    /// HTTP 5xx.
    Http5xx(u16),
    /// Anything else: other 4xx, authentication, contract failures.
    Other,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Bounded retries with exponential backoff and jitter.
///
/// Built once from [`RetryConfig`] when the client is constructed and shared
/// read-only by every request after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; at most `max_retries + 1` attempts run.
    pub max_retries: u32,
    pub retry_on_429: bool,
    pub retry_on_5xx: bool,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_on_429: true,
            retry_on_5xx: true,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            retry_on_429: cfg.retry_on_429,
            retry_on_5xx: cfg.retry_on_5xx,
            base_delay: Duration::from_millis(cfg.base_delay_ms),
            max_delay: Duration::from_millis(cfg.max_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Whether an error of this kind may be retried at all.
    pub fn is_retryable(&self, kind: ErrorKind) -> bool {
        match kind {
            ErrorKind::Timeout | ErrorKind::Connection => true,
            ErrorKind::Throttled { .. } => self.retry_on_429,
            ErrorKind::Http5xx(_) => self.retry_on_5xx,
            ErrorKind::Other => false,
        }
    }

    /// Decide what to do after attempt `attempt` (zero-based) failed with `kind`.
    ///
    /// A throttled error carrying `Retry-After` waits exactly that long;
    /// everything else uses [`backoff_delay`].
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_retries || !self.is_retryable(kind) {
            return RetryDecision::NoRetry;
        }
        match kind {
            ErrorKind::Throttled {
                retry_after: Some(secs),
            } if secs > 0 => RetryDecision::RetryAfter(Duration::from_secs(secs)),
            _ => RetryDecision::RetryAfter(backoff_delay(attempt, self.base_delay, self.max_delay)),
        }
    }
}

/// `min(base * 2^attempt, max)` plus uniform jitter in `[0, 30%]` of that
/// capped value, so the result may exceed `max` by up to 30%.
pub fn backoff_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    let capped = capped_exponential(attempt, base, max);
    let jitter = rand::thread_rng().gen_range(0.0..=JITTER_RATIO);
    capped + capped.mul_f64(jitter)
}

fn capped_exponential(attempt: u32, base: Duration, max: Duration) -> Duration {
    let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(max)
}
