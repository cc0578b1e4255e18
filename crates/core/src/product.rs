//! Product input normalization.
//!
//! Raw request bodies arrive loosely typed (the dashboard sends numeric
//! fields as either JSON numbers or strings). This module turns them into a
//! canonical shape before anything touches the store:
//! - `name` is trimmed and required
//! - `price` accepts a number or a numeric string and must parse finite
//! - `quantity` defaults to 0, rounds to the nearest integer, and clamps at 0
//! - `sku`/`description` distinguish "omitted" from "supplied but blank"
//!
//! Category resolution is deliberately not part of normalization: callers
//! normalize first, then resolve the category name against the store as a
//! separate effectful step.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer};

/// A JSON value that may arrive as a number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberLike {
    Number(f64),
    Text(String),
}

/// Patch semantics for optional text fields.
///
/// `Keep` means the field was omitted from the request body entirely: an
/// update leaves the stored value untouched, a create leaves it unset.
/// `Clear` and `Set` both come from a supplied field (`null`, `""`, or a
/// value); blank-after-trim input clears rather than storing empty strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TextPatch {
    #[default]
    Keep,
    Clear,
    Set(String),
}

impl TextPatch {
    /// Resolve the patch against the currently stored value.
    pub fn apply(&self, current: Option<String>) -> Option<String> {
        match self {
            Self::Keep => current,
            Self::Clear => None,
            Self::Set(value) => Some(value.clone()),
        }
    }

    /// Resolve the patch for a freshly created record (nothing to keep).
    pub fn into_initial(self) -> Option<String> {
        match self {
            Self::Keep | Self::Clear => None,
            Self::Set(value) => Some(value),
        }
    }
}

/// Deserialize helper distinguishing an omitted field from an explicit null.
fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Raw product payload as received on create/update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProductInput {
    pub name: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub sku: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub price: Option<NumberLike>,
    pub quantity: Option<NumberLike>,
    pub category_name: Option<String>,
}

/// Canonical product fields ready for a store write.
///
/// The category association is resolved separately; see the store crate's
/// category resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedProduct {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub sku: TextPatch,
    pub description: TextPatch,
}

/// Validate and coerce a raw product payload.
///
/// Runs eagerly, before any store access; an error here guarantees the store
/// was not touched.
pub fn normalize_product_input(raw: &RawProductInput) -> Result<NormalizedProduct> {
    let name = raw.name.as_deref().map(str::trim).unwrap_or("");
    if name.is_empty() {
        return Err(Error::validation("name", "name is required"));
    }

    let price = parse_price(raw.price.as_ref())?;

    Ok(NormalizedProduct {
        name: name.to_string(),
        price,
        quantity: parse_quantity(raw.quantity.as_ref()),
        sku: text_patch(&raw.sku),
        description: text_patch(&raw.description),
    })
}

/// Canonicalize a raw category name: trim, treat blank as absent.
pub fn normalize_category_name(raw: Option<&str>) -> Option<String> {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => None,
    }
}

fn parse_price(value: Option<&NumberLike>) -> Result<f64> {
    let parsed = match value {
        Some(NumberLike::Number(n)) => Some(*n),
        Some(NumberLike::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    };
    match parsed {
        Some(price) if price.is_finite() => Ok(price),
        _ => Err(Error::validation("price", "price must be a finite number")),
    }
}

/// Coerce a quantity value. Absent, blank, and unparseable inputs all fall
/// back to 0 rather than erroring; fractional input rounds to the nearest
/// integer and negative results clamp to 0.
fn parse_quantity(value: Option<&NumberLike>) -> i64 {
    let parsed = match value {
        Some(NumberLike::Number(n)) => *n,
        Some(NumberLike::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return 0;
            }
            trimmed.parse::<f64>().unwrap_or(0.0)
        }
        None => return 0,
    };
    if !parsed.is_finite() {
        return 0;
    }
    parsed.round().max(0.0) as i64
}

fn text_patch(raw: &Option<Option<String>>) -> TextPatch {
    match raw {
        None => TextPatch::Keep,
        Some(value) => match value.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => TextPatch::Set(text.to_string()),
            _ => TextPatch::Clear,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(body: &str) -> RawProductInput {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn normalizes_numeric_string_price_and_quantity() {
        let input = raw(r#"{"name": "Chips", "price": "2.50", "quantity": "10"}"#);
        let product = normalize_product_input(&input).unwrap();
        assert_eq!(product.name, "Chips");
        assert_eq!(product.price, 2.5);
        assert_eq!(product.quantity, 10);
    }

    #[test]
    fn accepts_json_number_price() {
        let input = raw(r#"{"name": "Gadget", "price": 9.99}"#);
        assert_eq!(normalize_product_input(&input).unwrap().price, 9.99);
    }

    #[test]
    fn rejects_blank_name() {
        let input = raw(r#"{"name": "   ", "price": "5"}"#);
        let err = normalize_product_input(&input).unwrap_err();
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn rejects_missing_name() {
        let input = raw(r#"{"price": "5"}"#);
        assert_eq!(normalize_product_input(&input).unwrap_err().field(), "name");
    }

    #[test]
    fn rejects_unparseable_price() {
        let input = raw(r#"{"name": "Chips", "price": "cheap"}"#);
        assert_eq!(
            normalize_product_input(&input).unwrap_err().field(),
            "price"
        );
    }

    #[test]
    fn rejects_missing_and_null_price() {
        let missing = raw(r#"{"name": "Chips"}"#);
        assert_eq!(
            normalize_product_input(&missing).unwrap_err().field(),
            "price"
        );
        let null = raw(r#"{"name": "Chips", "price": null}"#);
        assert_eq!(normalize_product_input(&null).unwrap_err().field(), "price");
    }

    #[test]
    fn negative_price_is_accepted() {
        // Permissive by observed behavior; callers may tighten separately.
        let input = raw(r#"{"name": "Refund", "price": "-3"}"#);
        assert_eq!(normalize_product_input(&input).unwrap().price, -3.0);
    }

    #[test]
    fn trims_name() {
        let input = raw(r#"{"name": "  Chips  ", "price": 1}"#);
        assert_eq!(normalize_product_input(&input).unwrap().name, "Chips");
    }

    #[test]
    fn quantity_defaults_to_zero() {
        for body in [
            r#"{"name": "X", "price": 1}"#,
            r#"{"name": "X", "price": 1, "quantity": null}"#,
            r#"{"name": "X", "price": 1, "quantity": ""}"#,
            r#"{"name": "X", "price": 1, "quantity": "lots"}"#,
        ] {
            let product = normalize_product_input(&raw(body)).unwrap();
            assert_eq!(product.quantity, 0, "body: {body}");
        }
    }

    #[test]
    fn quantity_rounds_then_clamps() {
        let fractional = raw(r#"{"name": "X", "price": 1, "quantity": 2.6}"#);
        assert_eq!(normalize_product_input(&fractional).unwrap().quantity, 3);

        let negative = raw(r#"{"name": "X", "price": 1, "quantity": "-4"}"#);
        assert_eq!(normalize_product_input(&negative).unwrap().quantity, 0);

        let negative_fraction = raw(r#"{"name": "X", "price": 1, "quantity": -0.4}"#);
        assert_eq!(
            normalize_product_input(&negative_fraction).unwrap().quantity,
            0
        );
    }

    #[test]
    fn omitted_text_fields_keep() {
        let input = raw(r#"{"name": "X", "price": 1}"#);
        let product = normalize_product_input(&input).unwrap();
        assert_eq!(product.sku, TextPatch::Keep);
        assert_eq!(product.description, TextPatch::Keep);
    }

    #[test]
    fn supplied_blank_text_fields_clear() {
        let input = raw(r#"{"name": "X", "price": 1, "sku": "  ", "description": null}"#);
        let product = normalize_product_input(&input).unwrap();
        assert_eq!(product.sku, TextPatch::Clear);
        assert_eq!(product.description, TextPatch::Clear);
    }

    #[test]
    fn supplied_text_fields_set_trimmed() {
        let input = raw(r#"{"name": "X", "price": 1, "sku": " AB-1 "}"#);
        let product = normalize_product_input(&input).unwrap();
        assert_eq!(product.sku, TextPatch::Set("AB-1".to_string()));
    }

    #[test]
    fn text_patch_application() {
        let current = Some("old".to_string());
        assert_eq!(TextPatch::Keep.apply(current.clone()), current);
        assert_eq!(TextPatch::Clear.apply(current.clone()), None);
        assert_eq!(
            TextPatch::Set("new".to_string()).apply(current),
            Some("new".to_string())
        );

        assert_eq!(TextPatch::Keep.into_initial(), None);
        assert_eq!(TextPatch::Clear.into_initial(), None);
        assert_eq!(
            TextPatch::Set("v".to_string()).into_initial(),
            Some("v".to_string())
        );
    }

    #[test]
    fn category_name_normalization() {
        assert_eq!(normalize_category_name(None), None);
        assert_eq!(normalize_category_name(Some("")), None);
        assert_eq!(normalize_category_name(Some("   ")), None);
        assert_eq!(
            normalize_category_name(Some(" Snacks ")),
            Some("Snacks".to_string())
        );
    }
}
