//! "Shop by Category" tiles.

use medplus_core::{Category, Product};

use crate::catalog::{LoadState, category_tiles};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTileView {
    pub name: String,
    pub icon: String,
    pub count_label: String,
    /// Product listing searched by the category name.
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGridView {
    pub tiles: Vec<CategoryTileView>,
    /// Set when categories could not be loaded.
    pub error: Option<String>,
}

impl CategoryGridView {
    /// Build tiles; counts come from `products` and are zero when products
    /// are unavailable.
    #[must_use]
    pub fn new(categories: &LoadState<impl AsRef<[Category]>>, products: &[Product]) -> Self {
        match categories {
            LoadState::Loaded(categories) => Self {
                tiles: category_tiles(categories.as_ref(), products)
                    .into_iter()
                    .map(|tile| CategoryTileView {
                        count_label: format!("{} products", tile.product_count),
                        href: format!(
                            "/products?{}",
                            url::form_urlencoded::Serializer::new(String::new())
                                .append_pair("q", &tile.name)
                                .finish()
                        ),
                        name: tile.name,
                        icon: tile.icon,
                    })
                    .collect(),
                error: None,
            },
            LoadState::Failed(message) => Self {
                tiles: Vec::new(),
                error: Some(message.clone()),
            },
            LoadState::Loading => Self {
                tiles: Vec::new(),
                error: None,
            },
        }
    }

    /// Hidden while loading or when there is nothing to show.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.tiles.is_empty() || self.error.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use medplus_core::CategoryId;

    use super::*;

    #[test]
    fn test_tiles_with_counts_and_default_icon() {
        let categories = vec![Category {
            id: CategoryId::random(),
            name: "Baby Care".to_string(),
            icon: None,
        }];
        let grid = CategoryGridView::new(&LoadState::Loaded(categories), &[]);
        let tile = grid.tiles.first().unwrap();
        assert_eq!(tile.icon, "💊");
        assert_eq!(tile.count_label, "0 products");
        assert_eq!(tile.href, "/products?q=Baby+Care");
        assert!(grid.is_visible());
    }

    #[test]
    fn test_loading_is_hidden_and_failure_is_shown() {
        let loading = CategoryGridView::new(&LoadState::<Vec<Category>>::Loading, &[]);
        assert!(!loading.is_visible());

        let failed =
            CategoryGridView::new(&LoadState::<Vec<Category>>::Failed("down".to_string()), &[]);
        assert!(failed.is_visible());
        assert_eq!(failed.error.as_deref(), Some("down"));
    }
}
