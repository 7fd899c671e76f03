//! Cart drawer contents: lines, delivery progress and totals.

use medplus_core::{Price, ProductId};

use crate::cart::{Cart, CartLine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub brand: String,
    pub image_url: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
    pub requires_prescription: bool,
    /// Quantity the "−" button submits; it is disabled at one.
    pub decrement_to: u32,
    pub increment_to: u32,
}

impl CartLineView {
    #[must_use]
    pub const fn can_decrement(&self) -> bool {
        self.quantity > 1
    }
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id,
            name: line.product.name.clone(),
            brand: line.product.brand.clone(),
            image_url: line.product.image_url.clone(),
            unit_price: line.product.price.to_string(),
            quantity: line.quantity,
            line_total: line.line_total().to_string(),
            requires_prescription: line.product.requires_prescription,
            decrement_to: line.quantity.saturating_sub(1).max(1),
            increment_to: line.quantity.saturating_add(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartPanelView {
    /// "Your Cart ({n})", n = distinct products.
    pub title: String,
    pub lines: Vec<CartLineView>,
    pub delivery_message: String,
    pub free_delivery: bool,
    pub subtotal: String,
    /// "Free" when no fee is owed.
    pub delivery_fee: String,
    pub total: String,
    pub item_count: u32,
    /// A cart change that could not be saved.
    pub error: Option<String>,
}

impl CartPanelView {
    #[must_use]
    pub fn new(cart: &Cart, error: Option<String>) -> Self {
        let summary = cart.summary();
        let delivery_message = summary.free_delivery_shortfall.map_or_else(
            || "🎉 Congratulations! You get free delivery".to_string(),
            |shortfall| format!("Add {shortfall} more for free delivery"),
        );

        Self {
            title: format!("Your Cart ({})", summary.line_count),
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            delivery_message,
            free_delivery: summary.free_delivery_shortfall.is_none(),
            subtotal: summary.subtotal.to_string(),
            delivery_fee: fee_label(summary.delivery_fee),
            total: summary.total.to_string(),
            item_count: summary.item_count,
            error,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn fee_label(fee: Price) -> String {
    if fee.is_zero() {
        "Free".to_string()
    } else {
        fee.to_string()
    }
}
