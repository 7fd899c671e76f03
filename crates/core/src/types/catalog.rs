//! Catalog domain types: products and categories.
//!
//! Field names follow the hosted database columns so rows deserialize
//! directly; display fallbacks for the nullable columns live here too.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::price::Price;

/// Brand shown when a product has none.
pub const DEFAULT_BRAND: &str = "Generic";

/// Category name shown when a product has no category.
pub const DEFAULT_CATEGORY_NAME: &str = "Medicine";

/// Icon shown for a category without one.
pub const DEFAULT_CATEGORY_ICON: &str = "💊";

/// Image shown for a product without one.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder.svg";

/// Category name and icon joined onto a product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Category {
    /// Icon to render, falling back to a pill.
    #[must_use]
    pub fn icon_or_default(&self) -> &str {
        self.icon
            .as_deref()
            .filter(|icon| !icon.is_empty())
            .unwrap_or(DEFAULT_CATEGORY_ICON)
    }
}

/// A product as fetched from the catalog.
///
/// Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub price: Price,
    /// Pre-discount price, when the product is on sale.
    #[serde(default)]
    pub original_price: Option<Price>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Joined category row (`categories(name, icon)` in the select).
    #[serde(default, rename = "categories")]
    pub category: Option<CategoryRef>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub requires_prescription: bool,
    #[serde(default, deserialize_with = "null_stock_as_zero")]
    pub stock: u32,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default, deserialize_with = "null_stock_as_zero")]
    pub review_count: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub side_effects: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Whether any units are available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Discount against the original price, if the product is on sale.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        self.original_price?.discount_percent_to(self.price)
    }

    /// Brand to render.
    #[must_use]
    pub fn brand_or_default(&self) -> &str {
        self.brand
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_BRAND)
    }

    /// Category name to render.
    #[must_use]
    pub fn category_name(&self) -> &str {
        self.category
            .as_ref()
            .map_or(DEFAULT_CATEGORY_NAME, |c| c.name.as_str())
    }

    /// Image URL to render.
    #[must_use]
    pub fn image_or_placeholder(&self) -> &str {
        self.image_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(PLACEHOLDER_IMAGE)
    }
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Nullable integer columns; negative values (stock corrections) read as zero.
fn null_stock_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<i64>::deserialize(deserializer)?.unwrap_or(0);
    Ok(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ROW: &str = r#"{
        "id": "0b7a4c4e-7f55-4b8e-9a43-3f1c2d9e8a10",
        "name": "Paracetamol 500mg",
        "description": "Fever and mild pain relief",
        "price": 45,
        "image_url": null,
        "stock": null,
        "requires_prescription": null,
        "brand": null,
        "dosage": "1 tablet every 6 hours",
        "side_effects": null,
        "manufacturer": "Cipla",
        "category_id": "5f0d1b7c-2a8e-4c3d-9b6a-7e1f0c2d3b4a",
        "created_at": "2024-03-01T10:00:00+00:00",
        "categories": { "name": "Pain Relief", "icon": null }
    }"#;

    #[test]
    fn test_deserialize_hosted_row_with_nulls() {
        let product: Product = serde_json::from_str(ROW).unwrap();
        assert_eq!(product.price, Price::from_rupees(45));
        assert_eq!(product.stock, 0);
        assert!(!product.in_stock());
        assert!(!product.requires_prescription);
        assert_eq!(product.brand_or_default(), "Generic");
        assert_eq!(product.category_name(), "Pain Relief");
        assert_eq!(product.image_or_placeholder(), PLACEHOLDER_IMAGE);
        assert_eq!(product.discount_percent(), None);
        assert_eq!(product.manufacturer.as_deref(), Some("Cipla"));
    }

    #[test]
    fn test_negative_stock_reads_as_zero() {
        let row = ROW.replace("\"stock\": null", "\"stock\": -3");
        let product: Product = serde_json::from_str(&row).unwrap();
        assert_eq!(product.stock, 0);
    }

    #[test]
    fn test_discount_percent_uses_original_price() {
        let mut product: Product = serde_json::from_str(ROW).unwrap();
        product.original_price = Some(Price::from_rupees(60));
        assert_eq!(product.discount_percent(), Some(25));
    }

    #[test]
    fn test_missing_category_falls_back() {
        let row = ROW.replace(
            r#""categories": { "name": "Pain Relief", "icon": null }"#,
            r#""categories": null"#,
        );
        let product: Product = serde_json::from_str(&row).unwrap();
        assert_eq!(product.category_name(), DEFAULT_CATEGORY_NAME);
    }

    #[test]
    fn test_category_icon_fallback() {
        let category = Category {
            id: CategoryId::random(),
            name: "Vitamins".to_string(),
            icon: Some(String::new()),
        };
        assert_eq!(category.icon_or_default(), DEFAULT_CATEGORY_ICON);
    }
}
