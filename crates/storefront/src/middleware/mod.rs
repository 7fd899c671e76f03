//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request spans)
//! 3. Request ID (add unique ID to each request)
//! 4. CSP nonce (generate per-request nonce for script tags)
//! 5. Security headers (CSP, frame, referrer, permissions)
//! 6. Session layer (tower-sessions with an in-memory store)
//! 7. Rate limiting on auth posts (governor)

pub mod auth;
pub mod csp;
pub mod htmx;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{LOGIN_PATH, OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use htmx::{CART_UPDATED_EVENT, HX_TRIGGER, HxRequest, navigate};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
