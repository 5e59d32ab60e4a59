//! Privileged menu operations.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use endulque_core::ProductId;

use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::services::catalog;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeleteMenuItem {
    pub product_id: ProductId,
}

/// Delete a product's images with the service-role key, then the product.
#[instrument(skip(state, admin), fields(product_id = %req.product_id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Json(req): Json<DeleteMenuItem>,
) -> Result<StatusCode> {
    catalog::delete_product(state.pool(), state.storage(), state.owner_id(), req.product_id)
        .await?;
    crate::error::add_breadcrumb("catalog", "product deleted", &admin.email);
    Ok(StatusCode::NO_CONTENT)
}
