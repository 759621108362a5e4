//! Blocking transport seam and its libcurl implementation.
//!
//! A [`Transport`] performs exactly one physical HTTP exchange on the calling
//! thread. The executor runs it on tokio's blocking pool and owns timeout and
//! retry; the transport only has to honour the [`AbortSignal`].

use std::str;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::{HttpRequest, HttpResponse, Method};

/// Slack added to the executor timeout for curl's own wall-clock limit, so the
/// executor's timer normally fires first.
const BACKSTOP_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transfer was stopped through its [`AbortSignal`].
    #[error("transfer aborted")]
    Aborted,
    /// The transport's own timeout expired.
    #[error("transfer timed out")]
    TimedOut,
    /// Could not reach the server, or the connection broke mid-exchange.
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("transport error: {0}")]
    Other(String),
}

impl From<curl::Error> for TransportError {
    fn from(e: curl::Error) -> Self {
        if e.is_aborted_by_callback() {
            TransportError::Aborted
        } else if e.is_operation_timedout() {
            TransportError::TimedOut
        } else if e.is_couldnt_connect()
            || e.is_couldnt_resolve_host()
            || e.is_couldnt_resolve_proxy()
            || e.is_read_error()
            || e.is_recv_error()
            || e.is_send_error()
            || e.is_got_nothing()
        {
            TransportError::Connection(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// Abort flags for one attempt: the executor's timeout flag plus the caller's
/// optional cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    timed_out: Arc<AtomicBool>,
    external: Option<Arc<AtomicBool>>,
}

impl AbortSignal {
    pub fn new(external: Option<Arc<AtomicBool>>) -> Self {
        Self {
            timed_out: Arc::new(AtomicBool::new(false)),
            external,
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.timed_out()
            || self
                .external
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// True once the executor's timer has fired for this attempt.
    pub fn timed_out(&self) -> bool {
        self.timed_out.load(Ordering::Relaxed)
    }

    pub(crate) fn trip_timeout(&self) {
        self.timed_out.store(true, Ordering::Relaxed);
    }
}

/// Performs one HTTP exchange, blocking the current thread.
pub trait Transport: Send + Sync {
    fn perform(
        &self,
        request: &HttpRequest,
        abort: &AbortSignal,
    ) -> Result<HttpResponse, TransportError>;
}

/// libcurl transport. One easy handle per request; progress callbacks poll the
/// abort signal so a tripped timeout or cancellation stops the transfer.
#[derive(Debug, Clone, Copy)]
pub struct CurlTransport {
    pub connect_timeout: Duration,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
        }
    }
}

impl Transport for CurlTransport {
    fn perform(
        &self,
        request: &HttpRequest,
        abort: &AbortSignal,
    ) -> Result<HttpResponse, TransportError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(&request.url)?;
        easy.connect_timeout(self.connect_timeout)?;
        if let Some(timeout) = request.timeout {
            easy.timeout(timeout + BACKSTOP_GRACE)?;
        }
        easy.progress(true)?;

        match request.method {
            Method::Get => easy.get(true)?,
            Method::Post => easy.post(true)?,
            other => easy.custom_request(other.as_str())?,
        }
        match &request.body {
            Some(body) => easy.post_fields_copy(body)?,
            // Empty POST: without fields curl would wait on a read callback.
            None if request.method == Method::Post => easy.post_fields_copy(&[])?,
            None => {}
        }

        let mut list = curl::easy::List::new();
        for (k, v) in &request.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        easy.http_headers(list)?;

        let mut body = Vec::new();
        let mut header_lines: Vec<String> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    let line = s.trim_end();
                    // A new status line (redirect, 100-continue) starts a fresh header block.
                    if line.starts_with("HTTP/") {
                        header_lines.clear();
                    } else if !line.is_empty() {
                        header_lines.push(line.to_string());
                    }
                }
                true
            })?;
            transfer.progress_function(|_, _, _, _| !abort.is_aborted())?;
            transfer.perform()?;
        }

        let status = u16::try_from(easy.response_code()?)
            .map_err(|_| TransportError::Other("response code out of range".to_string()))?;
        Ok(HttpResponse {
            status,
            headers: parse_header_lines(&header_lines),
            body,
        })
    }
}

fn parse_header_lines(lines: &[String]) -> Vec<(String, String)> {
    lines
        .iter()
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}
