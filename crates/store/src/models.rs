//! Database models mapping to the inventory schema.

use sqlx::FromRow;
use stockroom_core::product::TextPatch;
use time::OffsetDateTime;

/// Registered user record.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

/// Fields for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

/// Bearer session record. The raw token is never stored, only its hash.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: i64,
    pub token_hash: String,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub last_used_at: Option<OffsetDateTime>,
}

/// Fields for creating a session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub token_hash: String,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

/// Category record.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
}

/// Product record.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i64,
    pub category_id: Option<i64>,
    pub created_at: OffsetDateTime,
}

/// Product record joined with its category name (if any).
#[derive(Debug, Clone, FromRow)]
pub struct ProductWithCategoryRow {
    pub id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i64,
    pub category_id: Option<i64>,
    pub created_at: OffsetDateTime,
    pub category_name: Option<String>,
}

/// Fields for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i64,
    pub category_id: Option<i64>,
    pub created_at: OffsetDateTime,
}

/// Wholesale replacement fields for a product update.
///
/// name/price/quantity/category_id are always overwritten; sku and
/// description carry patch semantics so an omitted field preserves the
/// stored value.
#[derive(Debug, Clone)]
pub struct ProductChanges {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub sku: TextPatch,
    pub description: TextPatch,
    pub category_id: Option<i64>,
}
