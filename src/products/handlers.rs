// HTTP handlers for the product catalog

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::error::ApiError;
use crate::products::models::Product;
use crate::query::{Page, PageParams};
use crate::AppState;

/// Get a product by id
#[utoipa::path(
    get,
    path = "/api/products/{product_id}",
    params(("product_id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    tracing::debug!("Fetching product with id: {}", product_id);

    let product = state
        .products
        .find_by_id(&product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Product".to_string(),
            id: product_id.clone(),
        })?;

    Ok(Json(product))
}

/// List products, paginated
#[utoipa::path(
    get,
    path = "/api/products",
    params(PageParams),
    responses(
        (status = 200, description = "One page of products", body = crate::query::ProductPage)
    ),
    tag = "products"
)]
pub async fn list_products_handler(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Product>>, ApiError> {
    let window = params.window();
    let (products, total) = state.products.list(window.offset, window.limit).await?;

    tracing::debug!("Retrieved {} of {} products", products.len(), total);
    Ok(Json(Page::new(window, total, products)))
}
