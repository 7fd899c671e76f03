//! Domain models for storefront.
//!
//! Only session-scoped types live here; catalog types come from
//! `medplus-core`.

pub mod session;

pub use session::{CurrentUser, Flash, keys as session_keys};
