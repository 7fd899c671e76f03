//! Cache types for catalog reads.

use std::sync::Arc;

use medplus_core::{Category, Product};

/// Cache key for catalog lists.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<[Product]>),
    Categories(Arc<[Category]>),
}
