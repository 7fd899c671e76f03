//! Core types for MedPlus.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod email;
pub mod id;
pub mod price;

pub use catalog::{
    Category, CategoryRef, DEFAULT_BRAND, DEFAULT_CATEGORY_ICON, DEFAULT_CATEGORY_NAME,
    PLACEHOLDER_IMAGE, Product,
};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CURRENCY_GLYPH, Price};
