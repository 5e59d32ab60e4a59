//! Menu route handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use endulque_core::ProductId;

use crate::db::MenuRepository;
use crate::error::Result;
use crate::models::{Menu, MenuProduct};
use crate::state::AppState;

/// `GET /api/menu` - the full menu, grouped by category.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Arc<Menu>>> {
    let menu = state
        .menu_cache()
        .menu(state.pool(), state.owner_id())
        .await?;
    Ok(Json(menu))
}

/// `GET /api/menu/{product_id}` - one product with variants and add-ons.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<MenuProduct>> {
    let product = MenuRepository::new(state.pool())
        .get_product(state.owner_id(), product_id)
        .await?;
    Ok(Json(product))
}
