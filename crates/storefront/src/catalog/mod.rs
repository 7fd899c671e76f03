//! Catalog query layer.
//!
//! # Architecture
//!
//! - Products and categories come from an injected [`CatalogSource`]
//! - Successful fetches are cached in memory via `moka` (TTL from config)
//! - Failures are never cached; the next request asks the source again
//! - Search is a pure in-memory filter over the fetched list and never
//!   reaches the backing store
//!
//! # Example
//!
//! ```rust,ignore
//! let catalog = Catalog::new(source, Duration::from_secs(300));
//!
//! match catalog.list_products().await {
//!     LoadState::Loaded(products) => search(&products, "para"),
//!     LoadState::Failed(message) => ...,
//!     LoadState::Loading => unreachable!(),
//! }
//! ```

mod cache;
mod search;
mod service;

use async_trait::async_trait;
use thiserror::Error;

use medplus_core::{Category, Product};

use crate::backend::BackendError;

pub use search::{CategoryTile, category_tiles, search};
pub use service::Catalog;

/// Where products and categories are read from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// All products with their category name/icon joined, newest first.
    async fn fetch_products(&self) -> Result<Vec<Product>, BackendError>;

    /// All categories, alphabetical.
    async fn fetch_categories(&self) -> Result<Vec<Category>, BackendError>;
}

/// Errors from the catalog layer.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The backing store could not be read.
    #[error("Catalog unavailable: {0}")]
    Backend(#[from] BackendError),
}

/// Progress of a catalog read, as rendered by the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<T> {
    /// Not fetched yet; rendered as skeleton tiles.
    Loading,
    /// Fetched successfully.
    Loaded(T),
    /// Fetch failed; carries the message shown to the shopper.
    Failed(String),
}

impl<T> LoadState<T> {
    /// Map the loaded value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadState<U> {
        match self {
            Self::Loading => LoadState::Loading,
            Self::Loaded(value) => LoadState::Loaded(f(value)),
            Self::Failed(message) => LoadState::Failed(message),
        }
    }

    /// The loaded value, if any.
    pub const fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}
