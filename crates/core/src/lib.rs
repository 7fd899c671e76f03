//! MedPlus Core - Shared domain types.
//!
//! This crate provides the types shared by the storefront server and its
//! integration tests:
//! - `storefront` - Public-facing pharmacy site
//! - `integration-tests` - End-to-end tests over HTTP
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no session
//! handling. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, rupee prices, emails, products and categories

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
