//! Variant, add-on and ready-date route handlers.
//!
//! Listing and creation are nested under their product; updates and deletes
//! address the row directly.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use endulque_core::{AddOnId, ProductId, ReadyDateId, VariantId};

use crate::db::{AddOnRepository, ProductRepository, ReadyDateRepository, VariantRepository};
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::{AddOn, PricedInput, ReadyDate, ReadyDateInput, Variant};
use crate::state::AppState;

/// 404 unless the product is the owner's.
async fn owned_product(state: &AppState, id: ProductId) -> Result<()> {
    ProductRepository::new(state.pool())
        .get(state.owner_id(), id)
        .await?;
    Ok(())
}

// =============================================================================
// Variants
// =============================================================================

pub async fn list_variants(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<Variant>>> {
    owned_product(&state, product_id).await?;
    Ok(Json(
        VariantRepository::new(state.pool()).list(product_id).await?,
    ))
}

pub async fn create_variant(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Path(product_id): Path<ProductId>,
    Json(input): Json<PricedInput>,
) -> Result<(StatusCode, Json<Variant>)> {
    let input = input.validate()?;
    let variant = VariantRepository::new(state.pool())
        .create(state.owner_id(), product_id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(variant)))
}

pub async fn update_variant(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Path(id): Path<VariantId>,
    Json(input): Json<PricedInput>,
) -> Result<Json<Variant>> {
    let input = input.validate()?;
    Ok(Json(
        VariantRepository::new(state.pool())
            .update(state.owner_id(), id, &input)
            .await?,
    ))
}

pub async fn delete_variant(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Path(id): Path<VariantId>,
) -> Result<StatusCode> {
    VariantRepository::new(state.pool())
        .delete(state.owner_id(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Add-ons
// =============================================================================

pub async fn list_add_ons(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<AddOn>>> {
    owned_product(&state, product_id).await?;
    Ok(Json(AddOnRepository::new(state.pool()).list(product_id).await?))
}

pub async fn create_add_on(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Path(product_id): Path<ProductId>,
    Json(input): Json<PricedInput>,
) -> Result<(StatusCode, Json<AddOn>)> {
    let input = input.validate()?;
    let add_on = AddOnRepository::new(state.pool())
        .create(state.owner_id(), product_id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(add_on)))
}

pub async fn update_add_on(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Path(id): Path<AddOnId>,
    Json(input): Json<PricedInput>,
) -> Result<Json<AddOn>> {
    let input = input.validate()?;
    Ok(Json(
        AddOnRepository::new(state.pool())
            .update(state.owner_id(), id, &input)
            .await?,
    ))
}

pub async fn delete_add_on(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Path(id): Path<AddOnId>,
) -> Result<StatusCode> {
    AddOnRepository::new(state.pool())
        .delete(state.owner_id(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Ready dates
// =============================================================================

pub async fn list_ready_dates(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<ReadyDate>>> {
    owned_product(&state, product_id).await?;
    Ok(Json(
        ReadyDateRepository::new(state.pool())
            .list(product_id)
            .await?,
    ))
}

/// Add a ready date; a date already listed is a 409.
pub async fn create_ready_date(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Path(product_id): Path<ProductId>,
    Json(input): Json<ReadyDateInput>,
) -> Result<(StatusCode, Json<ReadyDate>)> {
    let ready_date = ReadyDateRepository::new(state.pool())
        .create(state.owner_id(), product_id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(ready_date)))
}

pub async fn delete_ready_date(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Path(id): Path<ReadyDateId>,
) -> Result<StatusCode> {
    ReadyDateRepository::new(state.pool())
        .delete(state.owner_id(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
