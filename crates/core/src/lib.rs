//! Core domain types and shared logic for the stockroom inventory API.
//!
//! This crate defines the pieces every other crate agrees on:
//! - Product input normalization (name/price/quantity coercion)
//! - Category name canonicalization
//! - Configuration types
//! - Domain error types

pub mod config;
pub mod error;
pub mod product;

pub use config::{AppConfig, AuthConfig, ServerConfig, StoreConfig};
pub use error::{Error, Result};
pub use product::{
    NormalizedProduct, NumberLike, RawProductInput, TextPatch, normalize_category_name,
    normalize_product_input,
};
