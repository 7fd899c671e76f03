//! Backing services for the catalog, accounts and cart mirror.
//!
//! # Architecture
//!
//! - [`HostedBackend`]: a hosted database/auth service speaking the
//!   PostgREST (`/rest/v1`) and GoTrue (`/auth/v1`) protocols over `reqwest`
//! - [`DemoBackend`]: a seeded in-memory catalog and account list for local
//!   runs and tests, with optional artificial latency
//!
//! Both implement [`CatalogSource`], [`AuthProvider`] and [`CartSync`]; the
//! rest of the crate only sees the [`Backend`] bundle of trait objects,
//! chosen once at startup from [`DataSource`].

mod demo;
mod hosted;
mod seed;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::auth::AuthProvider;
use crate::cart::CartSync;
use crate::catalog::CatalogSource;
use crate::config::DataSource;

pub use demo::{DEMO_PASSWORD, DEMO_USER_EMAIL, DemoBackend, PENDING_USER_EMAIL};
pub use hosted::HostedBackend;
pub use seed::product_id as seeded_product_id;

/// Errors that can occur when talking to a backing service.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The service answered with an error status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// The services a running storefront talks to.
#[derive(Clone)]
pub struct Backend {
    pub catalog: Arc<dyn CatalogSource>,
    pub auth: Arc<dyn AuthProvider>,
    /// `None` when signed-in carts are not mirrored.
    pub cart_sync: Option<Arc<dyn CartSync>>,
    /// Artificial add-to-cart delay.
    pub add_delay: Duration,
}

impl Backend {
    /// Build the backend selected by configuration.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Http` if the HTTP client cannot be built.
    pub fn from_data_source(source: &DataSource) -> Result<Self, BackendError> {
        match source {
            DataSource::Hosted(config) => Ok(Self::hosted(HostedBackend::new(config)?)),
            DataSource::Demo(config) => Ok(Self::demo(
                DemoBackend::seeded().with_auth_latency(config.auth_latency),
                config.cart_latency,
            )),
        }
    }

    /// Bundle a hosted backend.
    #[must_use]
    pub fn hosted(backend: HostedBackend) -> Self {
        let backend = Arc::new(backend);
        Self {
            catalog: backend.clone(),
            auth: backend.clone(),
            cart_sync: Some(backend),
            add_delay: Duration::ZERO,
        }
    }

    /// Bundle a demo backend.
    #[must_use]
    pub fn demo(backend: DemoBackend, add_delay: Duration) -> Self {
        let backend = Arc::new(backend);
        Self {
            catalog: backend.clone(),
            auth: backend.clone(),
            cart_sync: Some(backend),
            add_delay,
        }
    }
}
