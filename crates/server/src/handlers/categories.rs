//! Category endpoints.

use crate::auth::require_auth;
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::read_json_body;
use crate::handlers::products::{ProductResponse, product_row_to_response};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use stockroom_core::normalize_category_name;
use stockroom_store::CategoryFilter;
use stockroom_store::models::CategoryRow;
use stockroom_store::repos::{CategoryRepo, ProductRepo};

/// Query filters for listing categories.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryListQuery {
    pub search: Option<String>,
    pub has_products: Option<bool>,
    pub product_name: Option<String>,
}

/// Request to create a category.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
}

/// Category record.
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
}

/// Category with its products nested, as the dashboard tables expect.
#[derive(Debug, Serialize)]
pub struct CategoryWithProductsResponse {
    pub id: i64,
    pub name: String,
    pub products: Vec<ProductResponse>,
}

fn category_row_to_response(row: CategoryRow) -> CategoryResponse {
    CategoryResponse {
        id: row.id,
        name: row.name,
    }
}

async fn with_products(
    state: &AppState,
    category: CategoryRow,
) -> ApiResult<CategoryWithProductsResponse> {
    let products = state
        .store
        .list_products_in_category(category.id)
        .await?
        .into_iter()
        .map(product_row_to_response)
        .collect::<ApiResult<Vec<_>>>()?;
    Ok(CategoryWithProductsResponse {
        id: category.id,
        name: category.name,
        products,
    })
}

/// GET /api/categories - List categories with nested products.
///
/// Filters are translated to store queries: `search` and `productName` are
/// case-insensitive substring matches, `hasProducts` selects categories with
/// or without dependents.
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<CategoryListQuery>,
    req: Request,
) -> ApiResult<Json<Vec<CategoryWithProductsResponse>>> {
    require_auth(&req)?;

    let filter = CategoryFilter {
        search: query.search,
        has_products: query.has_products,
        product_name: query.product_name,
    };

    let categories = state.store.list_categories(&filter).await?;
    let mut out = Vec::with_capacity(categories.len());
    for category in categories {
        out.push(with_products(&state, category).await?);
    }
    Ok(Json(out))
}

/// GET /api/categories/{id} - Get a category with its products.
pub async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    req: Request,
) -> ApiResult<Json<CategoryWithProductsResponse>> {
    require_auth(&req)?;

    let category = state
        .store
        .get_category(category_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("category not found".to_string()))?;
    Ok(Json(with_products(&state, category).await?))
}

/// POST /api/categories - Create a category by name.
pub async fn create_category(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<(StatusCode, Json<CategoryResponse>)> {
    require_auth(&req)?;
    let payload: CreateCategoryRequest = read_json_body(req).await?;

    let name =
        normalize_category_name(payload.name.as_deref()).ok_or_else(|| ApiError::Validation {
            field: "name",
            message: "name is required".to_string(),
        })?;

    // A duplicate name surfaces as AlreadyExists and maps to 409.
    let created = state.store.create_category(&name).await?;
    tracing::debug!(category_id = created.id, "category created");

    Ok((
        StatusCode::CREATED,
        Json(category_row_to_response(created)),
    ))
}

/// DELETE /api/categories/{id} - Delete a category, returning the deleted
/// record. Products referencing it survive with their reference cleared.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    req: Request,
) -> ApiResult<Json<CategoryResponse>> {
    require_auth(&req)?;
    let deleted = state.store.delete_category(category_id).await?;
    tracing::debug!(category_id, "category deleted");
    Ok(Json(category_row_to_response(deleted)))
}
