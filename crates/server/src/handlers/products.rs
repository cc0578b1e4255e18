//! Product endpoints.

use crate::auth::require_auth;
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{format_timestamp, read_json_body};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use serde::Serialize;
use stockroom_core::{RawProductInput, normalize_product_input};
use stockroom_store::models::{NewProduct, ProductChanges, ProductRow, ProductWithCategoryRow};
use stockroom_store::repos::{CategoryRepo, ProductRepo};
use stockroom_store::resolve_category_id;
use time::OffsetDateTime;

/// Product record as stored (no category join).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i64,
    pub category_id: Option<i64>,
    pub created_at: String,
}

/// Flattened product view for the dashboard: the category relation is
/// replaced by a plain `categoryName`, empty when no category is associated.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i64,
    pub category_id: Option<i64>,
    pub created_at: String,
    pub category_name: String,
}

/// Flatten a product-with-category join into the client view model.
pub fn present_product(row: ProductWithCategoryRow) -> ApiResult<ProductView> {
    Ok(ProductView {
        id: row.id,
        name: row.name,
        sku: row.sku,
        description: row.description,
        price: row.price,
        quantity: row.quantity,
        category_id: row.category_id,
        created_at: format_timestamp(row.created_at)?,
        category_name: row.category_name.unwrap_or_default(),
    })
}

pub(crate) fn product_row_to_response(row: ProductRow) -> ApiResult<ProductResponse> {
    Ok(ProductResponse {
        id: row.id,
        name: row.name,
        sku: row.sku,
        description: row.description,
        price: row.price,
        quantity: row.quantity,
        category_id: row.category_id,
        created_at: format_timestamp(row.created_at)?,
    })
}

/// GET /api/products - List all products, newest first. Public.
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductView>>> {
    let rows = state.store.list_products_with_categories().await?;
    let views = rows
        .into_iter()
        .map(present_product)
        .collect::<ApiResult<Vec<_>>>()?;
    Ok(Json(views))
}

/// GET /api/products/{id} - Get a single product. Public.
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> ApiResult<Json<ProductView>> {
    let row = state
        .store
        .get_product_with_category(product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".to_string()))?;
    Ok(Json(present_product(row)?))
}

/// POST /api/products - Create a product.
///
/// Validation runs before any store access; the category name resolves
/// find-or-create afterwards, so a rejected payload never creates a
/// category either.
pub async fn create_product(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<(StatusCode, Json<ProductView>)> {
    require_auth(&req)?;
    let payload: RawProductInput = read_json_body(req).await?;

    let normalized = normalize_product_input(&payload)?;
    let categories: &dyn CategoryRepo = &*state.store;
    let category_id = resolve_category_id(categories, payload.category_name.as_deref()).await?;

    let created = state
        .store
        .create_product(&NewProduct {
            name: normalized.name,
            sku: normalized.sku.into_initial(),
            description: normalized.description.into_initial(),
            price: normalized.price,
            quantity: normalized.quantity,
            category_id,
            created_at: OffsetDateTime::now_utc(),
        })
        .await?;

    tracing::debug!(product_id = created.id, "product created");

    let joined = state
        .store
        .get_product_with_category(created.id)
        .await?
        .ok_or_else(|| ApiError::Internal("product missing after create".to_string()))?;
    Ok((StatusCode::CREATED, Json(present_product(joined)?)))
}

/// PUT /api/products/{id} - Replace the listed fields of a product.
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    req: Request,
) -> ApiResult<Json<ProductView>> {
    require_auth(&req)?;
    let payload: RawProductInput = read_json_body(req).await?;

    let normalized = normalize_product_input(&payload)?;
    let categories: &dyn CategoryRepo = &*state.store;
    let category_id = resolve_category_id(categories, payload.category_name.as_deref()).await?;

    let updated = state
        .store
        .update_product(
            product_id,
            &ProductChanges {
                name: normalized.name,
                price: normalized.price,
                quantity: normalized.quantity,
                sku: normalized.sku,
                description: normalized.description,
                category_id,
            },
        )
        .await?;

    let joined = state
        .store
        .get_product_with_category(updated.id)
        .await?
        .ok_or_else(|| ApiError::Internal("product missing after update".to_string()))?;
    Ok(Json(present_product(joined)?))
}

/// DELETE /api/products/{id} - Delete a product, returning the deleted record.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    req: Request,
) -> ApiResult<Json<ProductResponse>> {
    require_auth(&req)?;
    let deleted = state.store.delete_product(product_id).await?;
    tracing::debug!(product_id, "product deleted");
    Ok(Json(product_row_to_response(deleted)?))
}
