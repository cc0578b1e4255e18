//! Product repository trait.

use crate::error::StoreResult;
use crate::models::{NewProduct, ProductChanges, ProductRow, ProductWithCategoryRow};
use async_trait::async_trait;

/// Repository for products.
#[async_trait]
pub trait ProductRepo: Send + Sync {
    /// Persist a new product.
    async fn create_product(&self, product: &NewProduct) -> StoreResult<ProductRow>;

    /// Get a product by id.
    async fn get_product(&self, product_id: i64) -> StoreResult<Option<ProductRow>>;

    /// Get a product joined with its category name.
    async fn get_product_with_category(
        &self,
        product_id: i64,
    ) -> StoreResult<Option<ProductWithCategoryRow>>;

    /// List all products joined with their category names, newest first.
    async fn list_products_with_categories(&self) -> StoreResult<Vec<ProductWithCategoryRow>>;

    /// List the products referencing a category.
    async fn list_products_in_category(&self, category_id: i64) -> StoreResult<Vec<ProductRow>>;

    /// Replace the listed fields of a product wholesale.
    /// Returns `NotFound` if the id does not exist; nothing is written then.
    async fn update_product(
        &self,
        product_id: i64,
        changes: &ProductChanges,
    ) -> StoreResult<ProductRow>;

    /// Delete a product, returning the deleted row.
    async fn delete_product(&self, product_id: i64) -> StoreResult<ProductRow>;
}
