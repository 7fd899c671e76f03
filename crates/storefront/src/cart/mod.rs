//! Cart store.
//!
//! The cart is an ordered list of product lines owned by the browser
//! session. Handlers load it, translate form posts into [`CartAction`]s,
//! run them through [`CartService`] and save the result back, holding the
//! session's [`CartLocks`] entry for the whole write.
//!
//! # Pricing
//!
//! - Subtotal = Σ unit price × quantity, recomputed on every read
//! - Delivery is free for subtotals strictly above ₹499, otherwise ₹49

mod lock;
mod model;
mod store;
mod sync;

pub use lock::{CartLocks, CartWriteGuard};
pub use model::{
    Cart, CartAction, CartLine, CartProduct, CartSummary, DELIVERY_FEE, FREE_DELIVERY_THRESHOLD,
    delivery_fee,
};
pub use store::{clear_cart, load_cart, save_cart};
pub use sync::{CartOwner, CartService, CartSync, CartSyncError, MirrorOp, mirror_ops};
