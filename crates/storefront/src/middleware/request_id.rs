//! Request ID middleware for request tracing and correlation.
//!
//! Uses the upstream proxy's `x-request-id` when it looks like an ID,
//! otherwise a fresh UUID v4. The ID is recorded in the current span, tagged
//! on the Sentry scope and echoed in the response headers.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream ID accepted as-is.
const MAX_UPSTREAM_ID_LEN: usize = 128;

/// The upstream ID, if it is short and made only of `[A-Za-z0-9._:-]`.
///
/// Anything else never reaches the logs or the Sentry tags.
fn upstream_request_id(headers: &HeaderMap) -> Option<&str> {
    let id = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?;
    let well_formed = !id.is_empty()
        && id.len() <= MAX_UPSTREAM_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':'));
    if well_formed {
        Some(id)
    } else {
        tracing::debug!(len = id.len(), "Ignoring malformed upstream request id");
        None
    }
}

/// Middleware that ensures every request has a request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = upstream_request_id(request.headers())
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headers_with(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(id).unwrap());
        headers
    }

    #[test]
    fn test_proxy_ids_are_kept() {
        let headers = headers_with("cf-7f3a9c2b1d:edge.bom");
        assert_eq!(
            upstream_request_id(&headers),
            Some("cf-7f3a9c2b1d:edge.bom")
        );
    }

    #[test]
    fn test_malformed_ids_are_replaced() {
        assert_eq!(upstream_request_id(&HeaderMap::new()), None);
        assert_eq!(upstream_request_id(&headers_with("")), None);
        assert_eq!(upstream_request_id(&headers_with("id with spaces")), None);
        assert_eq!(upstream_request_id(&headers_with("a\"b")), None);
        assert_eq!(
            upstream_request_id(&headers_with(&"a".repeat(MAX_UPSTREAM_ID_LEN + 1))),
            None
        );
        assert!(upstream_request_id(&headers_with(&"a".repeat(MAX_UPSTREAM_ID_LEN))).is_some());
    }
}
