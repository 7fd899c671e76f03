//! Cached catalog service.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::instrument;

use medplus_core::{Category, Product, ProductId};

use super::cache::{CacheKey, CacheValue};
use super::{CatalogError, CatalogSource, LoadState};

/// Message shown when products cannot be loaded.
pub const PRODUCTS_FAILED_MESSAGE: &str = "We couldn't load products right now. Please try again.";

/// Message shown when categories cannot be loaded.
pub const CATEGORIES_FAILED_MESSAGE: &str =
    "We couldn't load categories right now. Please try again.";

/// Catalog reads over a [`CatalogSource`], cached per list.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    source: Arc<dyn CatalogSource>,
    cache: Cache<CacheKey, CacheValue>,
}

impl Catalog {
    /// Create a catalog whose successful reads live for `ttl`.
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(8).time_to_live(ttl).build();

        Self {
            inner: Arc::new(CatalogInner { source, cache }),
        }
    }

    /// All products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the source cannot be read. Failures are not
    /// cached.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<[Product]>, CatalogError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await
        {
            tracing::debug!(count = products.len(), "Catalog cache hit: products");
            return Ok(products);
        }

        let products: Arc<[Product]> = self.inner.source.fetch_products().await?.into();
        tracing::debug!(count = products.len(), "Fetched products");
        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// All categories, alphabetical.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the source cannot be read. Failures are not
    /// cached.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Arc<[Category]>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            tracing::debug!(count = categories.len(), "Catalog cache hit: categories");
            return Ok(categories);
        }

        let categories: Arc<[Category]> = self.inner.source.fetch_categories().await?.into();
        tracing::debug!(count = categories.len(), "Fetched categories");
        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;
        Ok(categories)
    }

    /// Products as a render state.
    pub async fn list_products(&self) -> LoadState<Arc<[Product]>> {
        match self.products().await {
            Ok(products) => LoadState::Loaded(products),
            Err(e) => {
                tracing::error!("Failed to load products: {e}");
                LoadState::Failed(PRODUCTS_FAILED_MESSAGE.to_string())
            }
        }
    }

    /// Categories as a render state.
    pub async fn list_categories(&self) -> LoadState<Arc<[Category]>> {
        match self.categories().await {
            Ok(categories) => LoadState::Loaded(categories),
            Err(e) => {
                tracing::error!("Failed to load categories: {e}");
                LoadState::Failed(CATEGORIES_FAILED_MESSAGE.to_string())
            }
        }
    }

    /// Look up one product in the (cached) product list.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the product list cannot be loaded.
    pub async fn find_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        let products = self.products().await?;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    /// Check that the source answers, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the source cannot be read.
    pub async fn check_ready(&self) -> Result<(), CatalogError> {
        self.inner.source.fetch_categories().await?;
        Ok(())
    }

    /// Drop every cached list.
    pub fn invalidate(&self) {
        self.inner.cache.invalidate_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use medplus_core::{CategoryId, Price};

    use super::*;
    use crate::backend::BackendError;

    #[derive(Default)]
    struct CountingSource {
        product_calls: AtomicUsize,
        category_calls: AtomicUsize,
        failing: AtomicBool,
    }

    fn sample_product(name: &str) -> Product {
        Product {
            id: ProductId::random(),
            name: name.to_string(),
            brand: None,
            price: Price::from_rupees(45),
            original_price: None,
            image_url: None,
            category_id: None,
            category: None,
            requires_prescription: false,
            stock: 10,
            rating: None,
            review_count: 0,
            description: None,
            dosage: None,
            side_effects: None,
            manufacturer: None,
            created_at: None,
        }
    }

    #[async_trait]
    impl CatalogSource for CountingSource {
        async fn fetch_products(&self) -> Result<Vec<Product>, BackendError> {
            self.product_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(BackendError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(vec![sample_product("Paracetamol"), sample_product("Ibuprofen")])
        }

        async fn fetch_categories(&self) -> Result<Vec<Category>, BackendError> {
            self.category_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(BackendError::RateLimited(5));
            }
            Ok(vec![Category {
                id: CategoryId::random(),
                name: "Pain Relief".to_string(),
                icon: None,
            }])
        }
    }

    fn catalog(source: &Arc<CountingSource>) -> Catalog {
        Catalog::new(source.clone(), Duration::from_secs(300))
    }

    #[tokio::test]
    async fn test_successful_reads_are_cached() {
        let source = Arc::new(CountingSource::default());
        let catalog = catalog(&source);

        let first = catalog.list_products().await;
        let second = catalog.list_products().await;

        assert_eq!(first.loaded().unwrap().len(), 2);
        assert_eq!(second.loaded().unwrap().len(), 2);
        assert_eq!(source.product_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let source = Arc::new(CountingSource::default());
        source.failing.store(true, Ordering::SeqCst);
        let catalog = catalog(&source);

        assert_eq!(
            catalog.list_products().await,
            LoadState::Failed(PRODUCTS_FAILED_MESSAGE.to_string())
        );
        assert!(matches!(
            catalog.list_categories().await,
            LoadState::Failed(_)
        ));

        source.failing.store(false, Ordering::SeqCst);
        assert!(catalog.list_products().await.loaded().is_some());
        assert_eq!(source.product_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_refetches() {
        let source = Arc::new(CountingSource::default());
        let catalog = catalog(&source);

        catalog.list_categories().await;
        catalog.invalidate();
        catalog.list_categories().await;

        assert_eq!(source.category_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_find_product() {
        let source = Arc::new(CountingSource::default());
        let catalog = catalog(&source);

        let products = catalog.products().await.unwrap();
        let wanted = products.first().unwrap().clone();

        assert_eq!(catalog.find_product(wanted.id).await.unwrap(), Some(wanted));
        assert_eq!(catalog.find_product(ProductId::random()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_check_ready_bypasses_cache() {
        let source = Arc::new(CountingSource::default());
        let catalog = catalog(&source);

        catalog.check_ready().await.unwrap();
        catalog.check_ready().await.unwrap();
        assert_eq!(source.category_calls.load(Ordering::SeqCst), 2);

        source.failing.store(true, Ordering::SeqCst);
        assert!(catalog.check_ready().await.is_err());
    }
}
