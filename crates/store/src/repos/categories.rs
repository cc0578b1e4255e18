//! Category repository trait and find-or-create resolution.

use crate::error::{StoreError, StoreResult};
use crate::models::CategoryRow;
use async_trait::async_trait;
use stockroom_core::normalize_category_name;

/// Filters for listing categories. All filters combine with AND.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    /// Case-insensitive substring match on the category name.
    pub search: Option<String>,
    /// Only categories with (true) or without (false) products.
    pub has_products: Option<bool>,
    /// Only categories containing a product whose name matches this
    /// case-insensitive substring.
    pub product_name: Option<String>,
}

/// Repository for categories.
#[async_trait]
pub trait CategoryRepo: Send + Sync {
    /// Create a category with an already-trimmed, non-empty name.
    /// Returns `AlreadyExists` if the name is taken.
    async fn create_category(&self, name: &str) -> StoreResult<CategoryRow>;

    /// Get a category by id.
    async fn get_category(&self, category_id: i64) -> StoreResult<Option<CategoryRow>>;

    /// Find a category by exact name. Case-sensitive.
    async fn find_category_by_name(&self, name: &str) -> StoreResult<Option<CategoryRow>>;

    /// List categories matching the filter, ordered by name.
    async fn list_categories(&self, filter: &CategoryFilter) -> StoreResult<Vec<CategoryRow>>;

    /// Delete a category, returning the deleted row.
    /// Products referencing it survive with their reference cleared.
    async fn delete_category(&self, category_id: i64) -> StoreResult<CategoryRow>;
}

/// Resolve a free-text category name to a category id, creating the
/// category on first reference.
///
/// Blank or absent input resolves to `None` without touching the store.
/// For an existing name this is a read-only lookup. Two concurrent
/// resolutions of the same new name can both miss the lookup; the store's
/// uniqueness constraint lets only one insert win, and the loser recovers
/// by re-querying for the winner's row instead of surfacing the conflict.
pub async fn resolve_category_id(
    repo: &dyn CategoryRepo,
    raw_name: Option<&str>,
) -> StoreResult<Option<i64>> {
    let Some(name) = normalize_category_name(raw_name) else {
        return Ok(None);
    };

    if let Some(existing) = repo.find_category_by_name(&name).await? {
        return Ok(Some(existing.id));
    }

    match repo.create_category(&name).await {
        Ok(created) => Ok(Some(created.id)),
        Err(StoreError::AlreadyExists(_)) => {
            // Lost a creation race; the winner's row is visible now.
            let winner = repo.find_category_by_name(&name).await?.ok_or_else(|| {
                StoreError::Internal(format!(
                    "category '{name}' missing after uniqueness conflict"
                ))
            })?;
            Ok(Some(winner.id))
        }
        Err(err) => Err(err),
    }
}
