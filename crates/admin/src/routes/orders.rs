//! Order route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use tracing::instrument;

use endulque_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAdminAuth;
use crate::models::{OrderDetail, OrderFilter, OrderSummary, StatusUpdate};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatusChanged {
    pub id: OrderId,
    pub from: OrderStatus,
    pub status: OrderStatus,
}

/// Orders, newest first. `?status=pending` filters.
pub async fn index(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<OrderSummary>>> {
    Ok(Json(OrderRepository::new(state.pool()).list(&filter).await?))
}

pub async fn show(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    Ok(Json(OrderRepository::new(state.pool()).detail(id).await?))
}

/// Move an order along its lifecycle. Disallowed moves are a 400.
#[instrument(skip(state, admin, req), fields(to = %req.status))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<OrderId>,
    Json(req): Json<StatusUpdate>,
) -> Result<Json<StatusChanged>> {
    let from = OrderRepository::new(state.pool())
        .update_status(id, req.status)
        .await?;
    add_breadcrumb("orders", &format!("order {id} -> {}", req.status), &admin.email);
    Ok(Json(StatusChanged {
        id,
        from,
        status: req.status,
    }))
}
