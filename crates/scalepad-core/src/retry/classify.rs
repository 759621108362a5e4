//! Classify HTTP outcomes and transport failures into the error taxonomy,
//! and errors into retry policy kinds.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, ErrorItem};
use crate::http::TransportError;
use crate::retry::policy::ErrorKind;

#[derive(Deserialize)]
struct ErrorEnvelope {
    errors: Vec<ErrorItem>,
}

/// Turns a non-2xx response into an [`ApiError`].
///
/// `body` is the best-effort parsed response body (`Value::Null` when it was
/// empty or not JSON); `retry_after` is the raw `Retry-After` header.
pub fn classify_http_status(status: u16, body: &Value, retry_after: Option<&str>) -> ApiError {
    let errors = error_items(status, body);
    match status {
        401 => ApiError::Authentication { errors },
        429 => ApiError::RateLimit {
            errors,
            retry_after: retry_after.and_then(parse_retry_after),
        },
        _ => ApiError::Api { status, errors },
    }
}

/// Items from the `{"errors": [...]}` envelope, or a single synthesized item
/// when the body does not have that shape (or lists no errors).
fn error_items(status: u16, body: &Value) -> Vec<ErrorItem> {
    match ErrorEnvelope::deserialize(body) {
        Ok(envelope) if !envelope.errors.is_empty() => envelope.errors,
        _ => {
            let detail = match body {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            vec![ErrorItem::new(
                format!("HTTP_{}", status),
                format!("HTTP {} error", status),
            )
            .with_detail(detail)]
        }
    }
}

/// Leading decimal digits of the header as whole seconds; `None` if there are none.
pub fn parse_retry_after(value: &str) -> Option<u64> {
    let value = value.trim();
    let digits = value
        .find(|c: char| !c.is_ascii_digit())
        .map_or(value, |end| &value[..end]);
    digits.parse().ok()
}

/// Maps a transport failure. An abort is a timeout only if the executor's own
/// timer tripped it; a caller-requested abort is a network error.
pub fn classify_transport_error(
    err: TransportError,
    timed_out: bool,
    timeout: Duration,
) -> ApiError {
    match err {
        TransportError::TimedOut => ApiError::Timeout { timeout },
        TransportError::Aborted if timed_out => ApiError::Timeout { timeout },
        TransportError::Aborted => ApiError::Network {
            message: "request aborted".to_string(),
            source: Some(TransportError::Aborted),
        },
        other => ApiError::Network {
            message: other.to_string(),
            source: Some(other),
        },
    }
}

/// Classify an API error into a retry policy kind.
pub fn classify(e: &ApiError) -> ErrorKind {
    match e {
        ApiError::Timeout { .. } => ErrorKind::Timeout,
        ApiError::Network { .. } => ErrorKind::Connection,
        ApiError::RateLimit { retry_after, .. } => ErrorKind::Throttled {
            retry_after: *retry_after,
        },
        ApiError::Api { status, .. } if (500..=599).contains(status) => ErrorKind::Http5xx(*status),
        ApiError::Api { .. } | ApiError::Authentication { .. } | ApiError::ResponseValidation { .. } => {
            ErrorKind::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn http_401_is_authentication_for_any_body() {
        for body in [json!(null), json!("nope"), json!({"errors": []})] {
            assert!(matches!(
                classify_http_status(401, &body, None),
                ApiError::Authentication { .. }
            ));
        }
    }

    #[test]
    fn http_429_carries_retry_after() {
        match classify_http_status(429, &json!(null), Some("5")) {
            ApiError::RateLimit { retry_after, .. } => assert_eq!(retry_after, Some(5)),
            other => panic!("unexpected: {other:?}"),
        }
        match classify_http_status(429, &json!(null), Some("soon")) {
            ApiError::RateLimit { retry_after, .. } => assert_eq!(retry_after, None),
            other => panic!("unexpected: {other:?}"),
        }
        match classify_http_status(429, &json!(null), None) {
            ApiError::RateLimit { retry_after, .. } => assert_eq!(retry_after, None),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn other_statuses_are_generic_api_errors() {
        match classify_http_status(404, &json!(null), None) {
            ApiError::Api { status, .. } => assert_eq!(status, 404),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn error_envelope_is_used_when_well_formed() {
        let body = json!({"errors": [
            {"code": "NOT_FOUND", "title": "Not found", "detail": "client 9"},
            {"code": "X", "title": "Second"}
        ]});
        let err = classify_http_status(404, &body, None);
        assert_eq!(
            err.errors(),
            &[
                ErrorItem::new("NOT_FOUND", "Not found").with_detail("client 9"),
                ErrorItem::new("X", "Second"),
            ]
        );
    }

    #[test]
    fn malformed_body_synthesizes_single_item() {
        let err = classify_http_status(502, &json!({"message": "bad gateway"}), None);
        assert_eq!(
            err.errors(),
            &[ErrorItem::new("HTTP_502", "HTTP 502 error")
                .with_detail(r#"{"message":"bad gateway"}"#)]
        );

        let err = classify_http_status(500, &json!("oops"), None);
        assert_eq!(err.errors()[0].detail.as_deref(), Some("oops"));

        let err = classify_http_status(500, &Value::Null, None);
        assert_eq!(err.errors()[0].detail.as_deref(), Some("null"));
    }

    #[test]
    fn empty_error_list_falls_back_to_synthetic_item() {
        let err = classify_http_status(400, &json!({"errors": []}), None);
        assert_eq!(err.errors().len(), 1);
        assert_eq!(err.errors()[0].code, "HTTP_400");
    }

    #[test]
    fn retry_after_parsing() {
        assert_eq!(parse_retry_after("10"), Some(10));
        assert_eq!(parse_retry_after(" 7 "), Some(7));
        assert_eq!(parse_retry_after("3s"), Some(3));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
        assert_eq!(parse_retry_after(""), None);
    }

    #[test]
    fn transport_abort_depends_on_who_aborted() {
        let t = Duration::from_millis(250);
        assert!(matches!(
            classify_transport_error(TransportError::Aborted, true, t),
            ApiError::Timeout { timeout } if timeout == t
        ));
        assert!(matches!(
            classify_transport_error(TransportError::Aborted, false, t),
            ApiError::Network { .. }
        ));
        assert!(matches!(
            classify_transport_error(TransportError::TimedOut, false, t),
            ApiError::Timeout { .. }
        ));
        assert!(matches!(
            classify_transport_error(TransportError::Connection("refused".into()), false, t),
            ApiError::Network { .. }
        ));
    }

    #[test]
    fn retry_kinds() {
        let api = |status| ApiError::Api {
            status,
            errors: vec![],
        };
        assert_eq!(classify(&api(500)), ErrorKind::Http5xx(500));
        assert_eq!(classify(&api(599)), ErrorKind::Http5xx(599));
        assert_eq!(classify(&api(400)), ErrorKind::Other);
        assert_eq!(classify(&api(404)), ErrorKind::Other);
        assert_eq!(
            classify(&ApiError::Authentication { errors: vec![] }),
            ErrorKind::Other
        );
        assert_eq!(
            classify(&ApiError::RateLimit {
                errors: vec![],
                retry_after: Some(2)
            }),
            ErrorKind::Throttled {
                retry_after: Some(2)
            }
        );
        assert_eq!(classify(&ApiError::network("x")), ErrorKind::Connection);
        assert_eq!(
            classify(&ApiError::ResponseValidation {
                message: String::new(),
                issues: vec![]
            }),
            ErrorKind::Other
        );
    }
}
