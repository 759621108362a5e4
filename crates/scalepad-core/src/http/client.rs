//! Request executor: one HTTP call's lifecycle (headers, timeout, success and
//! error branching), wrapped in the retry loop by [`HttpClient::request`].

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::transport::{AbortSignal, Transport};
use super::{find_header, HttpRequest, HttpResponse, Method, RequestOptions};
use crate::error::{ApiError, Result};
use crate::logging::{redact_headers, redact_secrets};
use crate::query::encode_query_string;
use crate::retry::{classify_http_status, classify_transport_error, run_with_retry, RetryPolicy};

/// Header that carries the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Executes authenticated JSON requests against one API base URL.
///
/// Successful calls return `Some(json)`, or `None` for `204 No Content`.
/// Every failure is an [`ApiError`].
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    api_key: String,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            retry,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Sends the request, retrying retryable failures per the client's policy.
    pub async fn request(&self, path: &str, options: &RequestOptions) -> Result<Option<Value>> {
        run_with_retry(&self.retry, options.abort.as_deref(), || {
            self.send(path, options)
        })
        .await
    }

    pub async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Option<Value>> {
        let path = if query.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, encode_query_string(query))
        };
        self.request(&path, &RequestOptions::new(Method::Get)).await
    }

    pub async fn post(&self, path: &str, body: Option<Value>) -> Result<Option<Value>> {
        let options = RequestOptions {
            body,
            ..RequestOptions::new(Method::Post)
        };
        self.request(path, &options).await
    }

    pub async fn patch(&self, path: &str, body: Option<Value>) -> Result<Option<Value>> {
        let options = RequestOptions {
            body,
            ..RequestOptions::new(Method::Patch)
        };
        self.request(path, &options).await
    }

    pub async fn delete(&self, path: &str) -> Result<Option<Value>> {
        self.request(path, &RequestOptions::new(Method::Delete)).await
    }

    /// One physical attempt: no retries.
    ///
    /// The transport runs on the blocking pool and races a timer; when the
    /// timer wins, the attempt's abort flag is raised so the transfer stops,
    /// and the call fails with [`ApiError::Timeout`].
    pub async fn send(&self, path: &str, options: &RequestOptions) -> Result<Option<Value>> {
        let request = HttpRequest {
            method: options.method,
            url: format!("{}{}", self.base_url, path),
            headers: self.build_headers(options),
            body: options.body.as_ref().map(|b| b.to_string().into_bytes()),
            timeout: Some(self.timeout),
        };
        let method = request.method;
        let url_for_log = redact_secrets(&request.url);
        tracing::debug!("{} {}", method, url_for_log);
        tracing::trace!(headers = ?redact_headers(&request.headers), "request headers");

        let signal = AbortSignal::new(options.abort.clone());
        let task = tokio::task::spawn_blocking({
            let transport = Arc::clone(&self.transport);
            let signal = signal.clone();
            move || transport.perform(&request, &signal)
        });

        let response = match tokio::time::timeout(self.timeout, task).await {
            Err(_elapsed) => {
                signal.trip_timeout();
                tracing::debug!("{} {} timed out after {:?}", method, url_for_log, self.timeout);
                return Err(ApiError::Timeout {
                    timeout: self.timeout,
                });
            }
            Ok(Err(join_err)) => {
                return Err(ApiError::network(format!("transport task failed: {}", join_err)));
            }
            Ok(Ok(Err(e))) => {
                return Err(classify_transport_error(e, signal.timed_out(), self.timeout));
            }
            Ok(Ok(Ok(response))) => response,
        };

        tracing::debug!("{} {} -> {}", method, url_for_log, response.status);
        handle_response(response)
    }

    /// Required headers, then caller headers over them, then `content-type`
    /// when a body is sent and none was given.
    fn build_headers(&self, options: &RequestOptions) -> Vec<(String, String)> {
        let mut headers = vec![
            ("accept".to_string(), "application/json".to_string()),
            (API_KEY_HEADER.to_string(), self.api_key.clone()),
        ];
        for (name, value) in &options.headers {
            set_header(&mut headers, name, value);
        }
        if options.body.is_some() && find_header(&headers, "content-type").is_none() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        headers
    }
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
        Some(entry) => entry.1 = value.to_string(),
        None => headers.push((name.to_string(), value.to_string())),
    }
}

fn handle_response(response: HttpResponse) -> Result<Option<Value>> {
    if response.is_success() {
        if response.status == 204 {
            return Ok(None);
        }
        return serde_json::from_slice(&response.body)
            .map(Some)
            .map_err(|e| ApiError::network(format!("invalid JSON in response body: {}", e)));
    }
    let body = serde_json::from_slice(&response.body).unwrap_or(Value::Null);
    Err(classify_http_status(
        response.status,
        &body,
        response.header("retry-after"),
    ))
}
