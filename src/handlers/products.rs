use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::info;

use crate::{
    db,
    error::AppResult,
    models::{CreatedProduct, InventoryItem, ProductFilters, ProductInput, ProductView},
    upload::ProductForm,
    AppState,
};

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_products(
    State(state): State<AppState>,
    Query(filters): Query<ProductFilters>,
) -> AppResult<Json<Vec<ProductView>>> {
    let start = Instant::now();
    let products = db::fetch_products(&state.db, filters.category()).await?;

    info!(
        count = products.len(),
        category = filters.category().unwrap_or("*"),
        elapsed_ms = start.elapsed().as_millis(),
        "Listed products"
    );

    Ok(Json(products.into_iter().map(ProductView::from).collect()))
}

pub async fn get_inventory(State(state): State<AppState>) -> AppResult<Json<Vec<InventoryItem>>> {
    let start = Instant::now();
    let rows = db::fetch_inventory(&state.db).await?;

    info!(
        count = rows.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Listed inventory"
    );

    Ok(Json(rows.into_iter().map(InventoryItem::from).collect()))
}

// ── Get by ID ─────────────────────────────────────────────────────────────────

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ProductView>> {
    let product = db::fetch_product_by_id(&state.db, id).await?;
    info!(id, "Fetched product");
    Ok(Json(product.into()))
}

/// Raw image bytes. Always labelled JPEG; the upload's real type is not recorded.
pub async fn get_image(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Response> {
    let image = db::fetch_product_image(&state.db, id).await?;
    info!(id, bytes = image.len(), "Served product image");
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], image).into_response())
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_product(
    State(state): State<AppState>,
    form: ProductForm,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let input = ProductInput::from_fields(&form.fields)?;
    let image = form.file.as_deref();

    let id = db::insert_product(&state.db, &input, image).await?;

    info!(id, name = %input.name, has_image = image.is_some(), "Created product");

    let product = CreatedProduct::new(id, input, image.is_some());
    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Product added!", "product": product })),
    ))
}

// ── Update ────────────────────────────────────────────────────────────────────

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    form: ProductForm,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let input = ProductInput::from_fields(&form.fields)?;
    let image = form.file.as_deref();

    let rows = db::update_product(&state.db, id, &input, image).await?;

    info!(id, rows, image_replaced = image.is_some(), "Updated product");

    Ok((StatusCode::OK, Json(json!({ "message": "Product updated!" }))))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let rows = db::delete_product(&state.db, id).await?;

    info!(id, rows, "Deleted product");

    Ok((StatusCode::OK, Json(json!({ "message": "Product deleted!" }))))
}
