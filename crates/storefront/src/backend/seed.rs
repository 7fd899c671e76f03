//! Seeded pharmacy catalog for the demo backend.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use medplus_core::{Category, CategoryId, CategoryRef, Price, Product, ProductId, stable_uuid};

/// `created_at` of the newest seeded product (2024-06-01T09:00:00Z).
const NEWEST_PRODUCT_AT: i64 = 1_717_232_400;

const SECONDS_PER_DAY: i64 = 86_400;

struct SeedCategory {
    slug: &'static str,
    name: &'static str,
    icon: &'static str,
}

const CATEGORIES: &[SeedCategory] = &[
    SeedCategory { slug: "pain-relief", name: "Pain Relief", icon: "💊" },
    SeedCategory { slug: "cold-flu", name: "Cold & Flu", icon: "🤧" },
    SeedCategory { slug: "vitamins", name: "Vitamins & Supplements", icon: "🍊" },
    SeedCategory { slug: "diabetes", name: "Diabetes Care", icon: "🩸" },
    SeedCategory { slug: "skin-care", name: "Skin Care", icon: "🧴" },
    SeedCategory { slug: "first-aid", name: "First Aid", icon: "🩹" },
];

struct SeedProduct {
    slug: &'static str,
    name: &'static str,
    brand: Option<&'static str>,
    /// Price in paise.
    price: i64,
    original_price: Option<i64>,
    category: Option<&'static str>,
    requires_prescription: bool,
    stock: u32,
    rating: Option<f32>,
    review_count: u32,
    description: &'static str,
    dosage: Option<&'static str>,
    side_effects: Option<&'static str>,
    manufacturer: Option<&'static str>,
}

/// Newest first.
const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        slug: "paracetamol-500",
        name: "Paracetamol 500mg Tablets",
        brand: Some("Crocin"),
        price: 4_500,
        original_price: Some(5_000),
        category: Some("pain-relief"),
        requires_prescription: false,
        stock: 240,
        rating: Some(4.6),
        review_count: 1_842,
        description: "Relieves fever and mild to moderate pain such as headache and toothache.",
        dosage: Some("1 tablet every 4-6 hours, not more than 4 tablets a day."),
        side_effects: Some("Rare: nausea, skin rash."),
        manufacturer: Some("GSK Consumer Healthcare"),
    },
    SeedProduct {
        slug: "amoxicillin-250",
        name: "Amoxicillin 250mg Capsules",
        brand: Some("Mox"),
        price: 8_950,
        original_price: None,
        category: Some("cold-flu"),
        requires_prescription: true,
        stock: 60,
        rating: Some(4.3),
        review_count: 412,
        description: "Penicillin antibiotic for bacterial infections of the ear, nose, throat and chest.",
        dosage: Some("As directed by your physician."),
        side_effects: Some("Diarrhoea, nausea, skin rash."),
        manufacturer: Some("Sun Pharma"),
    },
    SeedProduct {
        slug: "vitamin-c-500",
        name: "Vitamin C 500mg Chewable",
        brand: Some("Limcee"),
        price: 2_500,
        original_price: Some(3_000),
        category: Some("vitamins"),
        requires_prescription: false,
        stock: 500,
        rating: Some(4.7),
        review_count: 2_310,
        description: "Orange-flavoured chewable tablets to support immunity.",
        dosage: Some("1 tablet daily."),
        side_effects: None,
        manufacturer: Some("Abbott"),
    },
    SeedProduct {
        slug: "metformin-500",
        name: "Metformin 500mg Tablets",
        brand: Some("Glycomet"),
        price: 3_200,
        original_price: None,
        category: Some("diabetes"),
        requires_prescription: true,
        stock: 150,
        rating: Some(4.5),
        review_count: 967,
        description: "First-line treatment for type 2 diabetes.",
        dosage: Some("As directed by your physician, usually with meals."),
        side_effects: Some("Stomach upset, metallic taste."),
        manufacturer: Some("USV"),
    },
    SeedProduct {
        slug: "cetirizine-10",
        name: "Cetirizine 10mg Tablets",
        brand: Some("Zyrtec"),
        price: 3_500,
        original_price: None,
        category: Some("cold-flu"),
        requires_prescription: false,
        stock: 0,
        rating: Some(4.4),
        review_count: 733,
        description: "Antihistamine for sneezing, runny nose and itchy eyes.",
        dosage: Some("1 tablet once daily."),
        side_effects: Some("Drowsiness, dry mouth."),
        manufacturer: Some("Dr. Reddy's"),
    },
    SeedProduct {
        slug: "moisturising-lotion",
        name: "Moisturising Lotion 400ml",
        brand: Some("Cetaphil"),
        price: 124_900,
        original_price: Some(139_900),
        category: Some("skin-care"),
        requires_prescription: false,
        stock: 35,
        rating: Some(4.8),
        review_count: 3_120,
        description: "Fragrance-free daily moisturiser for dry and sensitive skin.",
        dosage: None,
        side_effects: None,
        manufacturer: Some("Galderma"),
    },
    SeedProduct {
        slug: "ibuprofen-400",
        name: "Ibuprofen 400mg Tablets",
        brand: Some("Brufen"),
        price: 1_800,
        original_price: None,
        category: Some("pain-relief"),
        requires_prescription: false,
        stock: 90,
        rating: Some(4.2),
        review_count: 588,
        description: "Anti-inflammatory pain relief for muscle and joint pain.",
        dosage: Some("1 tablet up to three times a day after food."),
        side_effects: Some("Heartburn, stomach pain."),
        manufacturer: Some("Abbott"),
    },
    SeedProduct {
        slug: "antiseptic-liquid",
        name: "Antiseptic Liquid 500ml",
        brand: Some("Dettol"),
        price: 18_000,
        original_price: Some(19_500),
        category: Some("first-aid"),
        requires_prescription: false,
        stock: 70,
        rating: Some(4.7),
        review_count: 4_015,
        description: "Disinfectant for cuts, grazes and household hygiene.",
        dosage: Some("Dilute before applying to skin."),
        side_effects: None,
        manufacturer: Some("Reckitt"),
    },
    SeedProduct {
        slug: "insulin-glargine",
        name: "Insulin Glargine 100IU/ml Pen",
        brand: Some("Lantus"),
        price: 71_500,
        original_price: None,
        category: Some("diabetes"),
        requires_prescription: true,
        stock: 12,
        rating: Some(4.6),
        review_count: 204,
        description: "Long-acting basal insulin, pre-filled pen.",
        dosage: Some("As directed by your physician."),
        side_effects: Some("Low blood sugar, injection site reactions."),
        manufacturer: Some("Sanofi"),
    },
    SeedProduct {
        slug: "cough-syrup",
        name: "Cough Syrup 100ml",
        brand: Some("Benadryl"),
        price: 11_500,
        original_price: None,
        category: Some("cold-flu"),
        requires_prescription: false,
        stock: 44,
        rating: Some(4.1),
        review_count: 1_276,
        description: "Soothing relief for dry and tickly coughs.",
        dosage: Some("10ml three times a day."),
        side_effects: Some("Drowsiness."),
        manufacturer: Some("Johnson & Johnson"),
    },
    SeedProduct {
        slug: "multivitamin",
        name: "Multivitamin Daily 60 Tablets",
        brand: None,
        price: 32_000,
        original_price: Some(40_000),
        category: Some("vitamins"),
        requires_prescription: false,
        stock: 80,
        rating: None,
        review_count: 0,
        description: "A-Z multivitamin and mineral formula.",
        dosage: Some("1 tablet daily after breakfast."),
        side_effects: None,
        manufacturer: None,
    },
    SeedProduct {
        slug: "digital-thermometer",
        name: "Digital Thermometer",
        brand: Some("Omron"),
        price: 24_900,
        original_price: None,
        category: None,
        requires_prescription: false,
        stock: 25,
        rating: Some(4.5),
        review_count: 860,
        description: "Fast 60-second reading with fever alarm.",
        dosage: None,
        side_effects: None,
        manufacturer: Some("Omron Healthcare"),
    },
];

fn category_id(slug: &str) -> CategoryId {
    CategoryId::new(stable_uuid(&format!("medplus:category:{slug}")))
}

/// Stable id of a seeded product.
pub fn product_id(slug: &str) -> ProductId {
    ProductId::new(stable_uuid(&format!("medplus:product:{slug}")))
}

fn paise(amount: i64) -> Price {
    Price::new(Decimal::new(amount, 2).normalize())
}

/// Seeded categories, alphabetical.
pub fn categories() -> Vec<Category> {
    let mut categories: Vec<Category> = CATEGORIES
        .iter()
        .map(|seed| Category {
            id: category_id(seed.slug),
            name: seed.name.to_string(),
            icon: Some(seed.icon.to_string()),
        })
        .collect();
    categories.sort_by(|a, b| a.name.cmp(&b.name));
    categories
}

/// Seeded products with their categories joined, newest first.
pub fn products() -> Vec<Product> {
    PRODUCTS
        .iter()
        .zip(0_i64..)
        .map(|(seed, age_days)| {
            let category = seed
                .category
                .and_then(|slug| CATEGORIES.iter().find(|c| c.slug == slug));
            Product {
                id: product_id(seed.slug),
                name: seed.name.to_string(),
                brand: seed.brand.map(str::to_string),
                price: paise(seed.price),
                original_price: seed.original_price.map(paise),
                image_url: None,
                category_id: category.map(|c| category_id(c.slug)),
                category: category.map(|c| CategoryRef {
                    name: c.name.to_string(),
                    icon: Some(c.icon.to_string()),
                }),
                requires_prescription: seed.requires_prescription,
                stock: seed.stock,
                rating: seed.rating,
                review_count: seed.review_count,
                description: Some(seed.description.to_string()),
                dosage: seed.dosage.map(str::to_string),
                side_effects: seed.side_effects.map(str::to_string),
                manufacturer: seed.manufacturer.map(str::to_string),
                created_at: DateTime::<Utc>::from_timestamp(
                    NEWEST_PRODUCT_AT - age_days * SECONDS_PER_DAY,
                    0,
                ),
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_are_alphabetical() {
        let names: Vec<String> = categories().into_iter().map(|c| c.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_products_are_newest_first_with_stable_ids() {
        let products = products();
        assert!(
            products
                .windows(2)
                .all(|pair| pair.first().unwrap().created_at > pair.get(1).unwrap().created_at)
        );
        assert_eq!(products.first().unwrap().id, product_id("paracetamol-500"));
        assert_eq!(products, super::products());
    }

    #[test]
    fn test_seed_covers_display_cases() {
        let products = products();
        assert!(products.iter().any(|p| p.requires_prescription));
        assert!(products.iter().any(|p| !p.in_stock()));
        assert!(products.iter().any(|p| p.discount_percent().is_some()));
        assert!(products.iter().any(|p| p.category.is_none()));
        assert!(products.iter().any(|p| p.brand.is_none()));

        let amoxicillin = products
            .iter()
            .find(|p| p.id == product_id("amoxicillin-250"))
            .unwrap();
        assert_eq!(amoxicillin.price.to_string(), "₹89.50");
        let paracetamol = products.first().unwrap();
        assert_eq!(paracetamol.price.to_string(), "₹45");
        assert_eq!(paracetamol.discount_percent(), Some(10));
    }
}
