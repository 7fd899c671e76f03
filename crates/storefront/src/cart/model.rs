//! The session cart and its reducer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use medplus_core::{Price, Product, ProductId};

/// Subtotals strictly above this ship free.
pub const FREE_DELIVERY_THRESHOLD: Price = Price::new(Decimal::from_parts(499, 0, 0, false, 0));

/// Flat delivery fee below the threshold.
pub const DELIVERY_FEE: Price = Price::new(Decimal::from_parts(49, 0, 0, false, 0));

/// Delivery fee owed for a subtotal.
#[must_use]
pub fn delivery_fee(subtotal: Price) -> Price {
    if subtotal > FREE_DELIVERY_THRESHOLD {
        Price::ZERO
    } else {
        DELIVERY_FEE
    }
}

/// Snapshot of the product fields a cart line needs.
///
/// Taken when the product is added so the cart renders without refetching
/// the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub price: Price,
    pub image_url: String,
    pub requires_prescription: bool,
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            brand: product.brand_or_default().to_string(),
            price: product.price,
            image_url: product.image_or_placeholder().to_string(),
            requires_prescription: product.requires_prescription,
        }
    }
}

/// One product in the cart. Quantity is always at least 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: CartProduct,
    pub quantity: u32,
}

impl CartLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price * self.quantity
    }
}

/// A state change requested by the shopper.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add one unit, creating the line if needed.
    Add(CartProduct),
    /// Set a line's quantity; zero or below removes it.
    UpdateQuantity { product_id: ProductId, quantity: i64 },
    /// Drop a line.
    Remove(ProductId),
}

impl CartAction {
    /// Short label for logs and breadcrumbs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::UpdateQuantity { .. } => "update_quantity",
            Self::Remove(_) => "remove",
        }
    }
}

/// Totals derived from the cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub total: Price,
    /// Sum of quantities (cart badge).
    pub item_count: u32,
    /// Number of distinct products.
    pub line_count: usize,
    /// How much more buys free delivery; `None` once delivery is free.
    pub free_delivery_shortfall: Option<Price>,
}

/// Ordered product to quantity mapping, first-added first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Apply an action.
    pub fn apply(&mut self, action: CartAction) {
        match action {
            CartAction::Add(product) => self.add(product),
            CartAction::UpdateQuantity {
                product_id,
                quantity,
            } => self.update_quantity(product_id, quantity),
            CartAction::Remove(product_id) => self.remove(product_id),
        }
    }

    /// Add one unit of a product.
    pub fn add(&mut self, product: CartProduct) {
        if let Some(line) = self.line_mut(product.id) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            self.lines.push(CartLine {
                product,
                quantity: 1,
            });
        }
    }

    /// Set a line's quantity. Zero or negative removes the line; unknown
    /// products are ignored.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }
        if let Some(line) = self.line_mut(product_id) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Remove a product's line if present.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.product.id != product_id);
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        let subtotal = self.subtotal();
        let delivery_fee = delivery_fee(subtotal);
        CartSummary {
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
            item_count: self.item_count(),
            line_count: self.lines.len(),
            free_delivery_shortfall: (!delivery_fee.is_zero())
                .then(|| FREE_DELIVERY_THRESHOLD.saturating_sub(subtotal)),
        }
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product.id == product_id)
    }
}
