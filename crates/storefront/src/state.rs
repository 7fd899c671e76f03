//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::AuthGateway;
use crate::backend::{Backend, BackendError};
use crate::cart::CartService;
use crate::catalog::Catalog;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration and the services
/// built over the selected backend.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    auth: AuthGateway,
    cart: CartService,
}

impl AppState {
    /// Build the state over the backend named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the hosted backend client cannot be built.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, BackendError> {
        let backend = Backend::from_data_source(&config.data_source)?;
        Ok(Self::new(config, backend))
    }

    /// Build the state over an already-constructed backend.
    #[must_use]
    pub fn new(config: StorefrontConfig, backend: Backend) -> Self {
        let catalog = Catalog::new(backend.catalog, config.catalog_cache_ttl);
        let auth = AuthGateway::new(backend.auth);
        let cart = CartService::new(backend.cart_sync).with_add_delay(backend.add_delay);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                auth,
                cart,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Cached catalog reads.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Sign-in, sign-up and sign-out.
    #[must_use]
    pub fn auth(&self) -> &AuthGateway {
        &self.inner.auth
    }

    /// Cart actions with optional remote mirroring.
    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }
}
