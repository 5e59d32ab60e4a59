//! Product route handlers.
//!
//! Products are deleted through `POST /api/menu/delete` so their images go
//! with them.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use endulque_core::{CategoryId, ProductId};

use super::read_image;
use crate::db::{CategoryRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::models::{Product, ProductDetail, ProductInput};
use crate::services::catalog;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category_id: Option<CategoryId>,
}

/// Reject a category id that is not one of the owner's.
async fn check_category(state: &AppState, input: &ProductInput) -> Result<()> {
    if let Some(category_id) = input.category_id
        && !CategoryRepository::new(state.pool())
            .exists(state.owner_id(), category_id)
            .await?
    {
        return Err(AppError::BadRequest(format!("unknown category {category_id}")));
    }
    Ok(())
}

pub async fn index(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let rows = ProductRepository::new(state.pool())
        .list(state.owner_id(), query.category_id)
        .await?;
    Ok(Json(rows))
}

/// Product with variants, add-ons and ready dates.
pub async fn show(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let detail = ProductRepository::new(state.pool())
        .detail(state.owner_id(), id)
        .await?;
    Ok(Json(detail))
}

#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let input = input.validate()?;
    check_category(&state, &input).await?;
    let product = ProductRepository::new(state.pool())
        .create(state.owner_id(), &input)
        .await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    let input = input.validate()?;
    check_category(&state, &input).await?;
    let product = ProductRepository::new(state.pool())
        .update(state.owner_id(), id, &input)
        .await?;
    Ok(Json(product))
}

/// Replace the product photo with the uploaded file.
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Json<Product>> {
    let (content_type, bytes) = read_image(multipart, state.storage()).await?;
    let product = catalog::replace_product_image(
        state.pool(),
        state.storage(),
        state.owner_id(),
        id,
        &content_type,
        bytes,
    )
    .await?;
    Ok(Json(product))
}
