//! Per-request CSP nonce.
//!
//! Every request gets a fresh nonce; templates put it on their `<script>`
//! tags and [`content_security_policy`] puts it in the header.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;

/// Origin HTMX is loaded from.
pub const HTMX_ORIGIN: &str = "https://unpkg.com";

/// Random bytes behind each nonce.
const NONCE_BYTES: usize = 16;

/// A CSP nonce: 128 random bits in the URL-safe base64 alphabet, no padding.
///
/// An empty nonce stands for "none issued" and is left out of the policy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CspNonce(String);

impl CspNonce {
    /// Generate a new random nonce.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }

    /// The value handed to the page layout.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// The policy sent with every response.
///
/// Scripts must be same-origin or from the HTMX CDN and carry the nonce
/// when one is present. Images may come from any https origin since product
/// photos live on the backend's storage host.
#[must_use]
pub fn content_security_policy(nonce: Option<&CspNonce>) -> String {
    let script_src = match nonce.map(CspNonce::value) {
        Some(value) if !value.is_empty() => format!("'self' 'nonce-{value}' {HTMX_ORIGIN}"),
        _ => format!("'self' {HTMX_ORIGIN}"),
    };
    format!(
        "default-src 'none'; \
         script-src {script_src}; \
         style-src 'self'; \
         font-src 'self'; \
         img-src 'self' https: data:; \
         connect-src 'self'; \
         frame-src 'none'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'"
    )
}

/// Middleware that generates a CSP nonce and stores it in request extensions.
///
/// Must run before `security_headers_middleware` so the nonce is available
/// when building the CSP header.
pub async fn csp_nonce_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(CspNonce::generate());
    next.run(request).await
}

impl<S> FromRequestParts<S> for CspNonce
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(nonce) = parts.extensions.get::<Self>() {
            return Ok(nonce.clone());
        }
        // Nothing was issued for this response's header either.
        tracing::warn!(path = %parts.uri.path(), "CSP nonce missing from request extensions");
        Ok(Self::default())
    }
}
