//! Retry loop: run an async operation until success or policy says stop.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::classify::classify;
use super::policy::{ErrorKind, RetryDecision, RetryPolicy};
use crate::error::Result;

/// Granularity at which a pending backoff notices caller cancellation.
const ABORT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs `op` until it succeeds or the retry policy says to stop, sleeping for
/// the backoff between attempts. At most `policy.max_retries + 1` attempts run
/// and the error of the last one is returned unchanged.
///
/// When `abort` is set, no further attempt starts and a pending backoff is
/// cut short; the most recent error is returned.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    abort: Option<&AtomicBool>,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        let e = match op().await {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };
        let kind = classify(&e);
        let delay = match policy.decide(attempt, kind) {
            RetryDecision::NoRetry => return Err(e),
            RetryDecision::RetryAfter(d) => d,
        };
        if is_aborted(abort) {
            return Err(e);
        }
        log_retry(kind, delay, attempt, policy.max_retries);
        if !sleep_unless_aborted(delay, abort).await {
            tracing::debug!("retry cancelled by caller during backoff");
            return Err(e);
        }
        attempt += 1;
    }
}

fn is_aborted(abort: Option<&AtomicBool>) -> bool {
    abort.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

/// Sleeps for `delay`; returns false if `abort` was raised first.
async fn sleep_unless_aborted(delay: Duration, abort: Option<&AtomicBool>) -> bool {
    let Some(flag) = abort else {
        tokio::time::sleep(delay).await;
        return true;
    };
    // `sleep` saturates delays past the timer's range; no deadline arithmetic here.
    let backoff = tokio::time::sleep(delay);
    tokio::pin!(backoff);
    loop {
        if flag.load(Ordering::Relaxed) {
            return false;
        }
        tokio::select! {
            _ = &mut backoff => return true,
            _ = tokio::time::sleep(ABORT_POLL_INTERVAL) => {}
        }
    }
}

fn log_retry(kind: ErrorKind, delay: Duration, attempt: u32, max_retries: u32) {
    let n = attempt + 1;
    match kind {
        ErrorKind::Throttled {
            retry_after: Some(secs),
        } if secs > 0 => {
            tracing::warn!("rate limited, retrying after {}s (attempt {}/{})", secs, n, max_retries);
        }
        ErrorKind::Http5xx(status) => {
            tracing::warn!(
                "server error {}, retrying in {}ms (attempt {}/{})",
                status,
                delay.as_millis(),
                n,
                max_retries
            );
        }
        _ => {
            tracing::warn!(
                "request failed ({:?}), retrying in {}ms (attempt {}/{})",
                kind,
                delay.as_millis(),
                n,
                max_retries
            );
        }
    }
}
