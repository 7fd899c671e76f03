//! Product cards and the grid that holds them.

use medplus_core::{Product, ProductId};

use crate::catalog::{LoadState, search};

/// Most products shown on the home page grid.
pub const HOME_GRID_LIMIT: usize = 8;

/// Skeleton tiles shown while the grid loads.
const SKELETON_TILES: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCardView {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub image_url: String,
    pub price: String,
    /// Struck-through pre-discount price, shown only with a discount.
    pub original_price: Option<String>,
    /// "{n}% OFF"
    pub discount_badge: Option<String>,
    pub requires_prescription: bool,
    /// One decimal, e.g. "4.5".
    pub rating: Option<String>,
    pub review_count: u32,
    pub in_stock: bool,
    pub quick_info_href: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        let discount = product.discount_percent();
        Self {
            id: product.id,
            name: product.name.clone(),
            brand: product.brand_or_default().to_string(),
            category: product.category_name().to_string(),
            image_url: product.image_or_placeholder().to_string(),
            price: product.price.to_string(),
            original_price: discount
                .and(product.original_price)
                .map(|price| price.to_string()),
            discount_badge: discount.map(|pct| format!("{pct}% OFF")),
            requires_prescription: product.requires_prescription,
            rating: product.rating.map(|rating| format!("{rating:.1}")),
            review_count: product.review_count,
            in_stock: product.in_stock(),
            quick_info_href: format!("/products/{}", product.id),
        }
    }
}

/// Quick info: the card plus the label copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInfoView {
    pub card: ProductCardView,
    pub description: Option<String>,
    pub dosage: Option<String>,
    pub side_effects: Option<String>,
    pub manufacturer: Option<String>,
}

impl From<&Product> for ProductInfoView {
    fn from(product: &Product) -> Self {
        Self {
            card: ProductCardView::from(product),
            description: product.description.clone(),
            dosage: product.dosage.clone(),
            side_effects: product.side_effects.clone(),
            manufacturer: product.manufacturer.clone(),
        }
    }
}

/// The product grid in one of its three load states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductGridView {
    /// "Popular Medicines", or "Search Results" while searching.
    pub heading: &'static str,
    pub query: String,
    pub cards: Vec<ProductCardView>,
    pub loading: bool,
    /// Inline error with a Retry button.
    pub error: Option<String>,
    /// No products matched the query.
    pub empty_message: Option<String>,
    /// Where the grid fragment is fetched (and retried) from.
    pub source_url: String,
}

impl ProductGridView {
    /// Filter `products` by `query` and keep at most `limit` cards.
    #[must_use]
    pub fn new(products: &LoadState<impl AsRef<[Product]>>, query: &str, limit: Option<usize>) -> Self {
        let query = query.to_string();
        let mut view = Self {
            heading: if query.is_empty() {
                "Popular Medicines"
            } else {
                "Search Results"
            },
            source_url: grid_url(&query, limit),
            query,
            cards: Vec::new(),
            loading: false,
            error: None,
            empty_message: None,
        };

        match products {
            LoadState::Loading => view.loading = true,
            LoadState::Failed(message) => view.error = Some(message.clone()),
            LoadState::Loaded(products) => {
                let matches = search(products.as_ref(), &view.query);
                view.cards = matches
                    .into_iter()
                    .take(limit.unwrap_or(usize::MAX))
                    .map(ProductCardView::from)
                    .collect();
                if view.cards.is_empty() && !view.query.is_empty() {
                    view.empty_message = Some(format!("No products found for \"{}\"", view.query));
                }
            }
        }
        view
    }

    /// Placeholder tiles for the loading state.
    #[must_use]
    pub fn skeletons(&self) -> std::ops::Range<usize> {
        0..if self.loading { SKELETON_TILES } else { 0 }
    }
}

fn grid_url(query: &str, limit: Option<usize>) -> String {
    let mut url = url::form_urlencoded::Serializer::new(String::new());
    if !query.is_empty() {
        url.append_pair("q", query);
    }
    if let Some(limit) = limit {
        url.append_pair("limit", &limit.to_string());
    }
    let params = url.finish();
    if params.is_empty() {
        "/products/grid".to_string()
    } else {
        format!("/products/grid?{params}")
    }
}
