//! HTMX request detection and response headers.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderName, HeaderValue, request::Parts},
    response::{IntoResponse, Redirect, Response},
};

/// Set by HTMX on every request it issues.
pub const HX_REQUEST: HeaderName = HeaderName::from_static("hx-request");

/// Tells HTMX to trigger a client-side event after the swap.
pub const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");

/// Tells HTMX to navigate the whole page.
pub const HX_REDIRECT: HeaderName = HeaderName::from_static("hx-redirect");

/// Event fired whenever the cart changes; badge and panel listen for it.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Whether `headers` come from an HTMX request.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get(HX_REQUEST)
        .is_some_and(|value| value.as_bytes() == b"true")
}

/// Send the browser to `to` after a form post.
///
/// HTMX would follow a 303 inside its XHR and swap the target page into the
/// fragment slot, so HTMX requests get `HX-Redirect` instead.
#[must_use]
pub fn navigate(htmx: bool, to: &'static str) -> Response {
    if htmx {
        ([(HX_REDIRECT, HeaderValue::from_static(to))], ()).into_response()
    } else {
        Redirect::to(to).into_response()
    }
}

/// Extractor: `HxRequest(true)` for HTMX requests.
#[derive(Debug, Clone, Copy)]
pub struct HxRequest(pub bool);

impl<S> FromRequestParts<S> for HxRequest
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(is_htmx(&parts.headers)))
    }
}
