//! In-memory product search and category tiles.

use medplus_core::{Category, CategoryId, Product};

/// Filter products by a free-text query.
///
/// Case-insensitive substring match on name, brand and category name. The
/// query is matched as typed, whitespace included; an empty query returns
/// every product.
#[must_use]
pub fn search<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return products.iter().collect();
    }

    products
        .iter()
        .filter(|product| {
            product.name.to_lowercase().contains(&needle)
                || product
                    .brand
                    .as_deref()
                    .is_some_and(|brand| brand.to_lowercase().contains(&needle))
                || product
                    .category
                    .as_ref()
                    .is_some_and(|category| category.name.to_lowercase().contains(&needle))
        })
        .collect()
}

/// A category with the number of products filed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTile {
    pub id: CategoryId,
    pub name: String,
    pub icon: String,
    pub product_count: usize,
}

/// Pair every category with its product count, keeping category order.
#[must_use]
pub fn category_tiles(categories: &[Category], products: &[Product]) -> Vec<CategoryTile> {
    categories
        .iter()
        .map(|category| CategoryTile {
            id: category.id,
            name: category.name.clone(),
            icon: category.icon_or_default().to_string(),
            product_count: products
                .iter()
                .filter(|p| p.category_id == Some(category.id))
                .count(),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use medplus_core::{CategoryRef, Price, ProductId};

    use super::*;

    fn product(name: &str, brand: Option<&str>, category: Option<(&Category, &str)>) -> Product {
        Product {
            id: ProductId::random(),
            name: name.to_string(),
            brand: brand.map(str::to_string),
            price: Price::from_rupees(100),
            original_price: None,
            image_url: None,
            category_id: category.map(|(c, _)| c.id),
            category: category.map(|(_, name)| CategoryRef {
                name: name.to_string(),
                icon: None,
            }),
            requires_prescription: false,
            stock: 1,
            rating: None,
            review_count: 0,
            description: None,
            dosage: None,
            side_effects: None,
            manufacturer: None,
            created_at: None,
        }
    }

    fn category(name: &str) -> Category {
        Category {
            id: CategoryId::random(),
            name: name.to_string(),
            icon: Some("🩹".to_string()),
        }
    }

    fn names<'a>(found: &[&'a Product]) -> Vec<&'a str> {
        found.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let products = vec![product("A", None, None), product("B", None, None)];
        assert_eq!(search(&products, "").len(), 2);
    }

    #[test]
    fn test_whitespace_query_is_a_literal_substring() {
        let products = vec![
            product("Paracetamol 500mg", None, None),
            product("Bandage", None, None),
        ];
        assert_eq!(names(&search(&products, " ")), vec!["Paracetamol 500mg"]);
        assert!(search(&products, "   ").is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_brand_category() {
        let vitamins = category("Vitamins");
        let products = vec![
            product("Paracetamol 500mg", Some("Crocin"), None),
            product("Multivitamin Gummies", Some("HealthKart"), None),
            product("Vitamin C Tablets", None, Some((&vitamins, "Vitamins"))),
            product("Cough Syrup", Some("Benadryl"), None),
        ];

        assert_eq!(names(&search(&products, "PARA")), vec!["Paracetamol 500mg"]);
        assert_eq!(names(&search(&products, "crocin")), vec!["Paracetamol 500mg"]);
        assert_eq!(
            names(&search(&products, "vitamin")),
            vec!["Multivitamin Gummies", "Vitamin C Tablets"]
        );
        assert_eq!(names(&search(&products, "benadryl")), vec!["Cough Syrup"]);
        assert!(search(&products, "insulin").is_empty());
    }

    #[test]
    fn test_category_counts_derive_from_category_ids() {
        let pain = category("Pain Relief");
        let skin = category("Skin Care");
        let products = vec![
            product("Ibuprofen", None, Some((&pain, "Pain Relief"))),
            product("Diclofenac Gel", None, Some((&pain, "Pain Relief"))),
            product("Uncategorised", None, None),
        ];

        let tiles = category_tiles(&[pain.clone(), skin.clone()], &products);
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles.first().unwrap().product_count, 2);
        assert_eq!(tiles.first().unwrap().icon, "🩹");
        assert_eq!(tiles.get(1).unwrap().product_count, 0);
        assert_eq!(tiles.get(1).unwrap().name, "Skin Care");
    }
}
