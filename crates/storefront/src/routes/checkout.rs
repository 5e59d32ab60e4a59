//! Checkout route handler.
//!
//! Turns the session cart into an order. Every cart item is re-resolved
//! against the live catalog first, so a stale cart cannot order at old
//! prices or include products that were removed.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use endulque_core::{BuyerId, BuyerInfo, NewOrder, OrderId, Phone, Price};

use crate::db::MenuRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::{SessionCart, session_keys};
use crate::routes::cart::load_cart;
use crate::services::place_order;
use crate::state::AppState;

/// Checkout request body.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// Checkout response body.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    pub buyer_id: BuyerId,
    pub total: Price,
    pub total_display: String,
}

/// Build the order for `cart`.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for a blank field or a malformed phone
/// number.
pub fn build_order(req: CheckoutRequest, cart: &SessionCart) -> Result<NewOrder> {
    let phone = Phone::parse(&req.phone)
        .map_err(|e| AppError::BadRequest(format!("phone: {e}")))?;

    Ok(NewOrder {
        buyer: BuyerInfo {
            name: req.name.trim().to_string(),
            address: req.address.trim().to_string(),
            phone: phone.into_inner(),
        },
        lines: cart.to_lines(),
    })
}

/// Drop the cart of a stored order and remember the order id.
///
/// The order is already committed, so a session failure is logged rather
/// than returned. Returns whether the session was updated.
pub(crate) async fn forget_cart(session: &Session, order_id: OrderId) -> bool {
    let result = async {
        session.remove::<SessionCart>(session_keys::CART).await?;
        session.insert(session_keys::LAST_ORDER_ID, order_id).await
    }
    .await;

    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, order_id = %order_id, "Failed to clear cart after order");
            false
        }
    }
}

/// `POST /api/checkout`
#[instrument(skip(state, session, req))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("cart is empty".to_string()));
    }

    let menu = MenuRepository::new(state.pool())
        .list_menu(state.owner_id())
        .await?;
    let cart = cart.reprice(&menu)?;

    let order = build_order(req, &cart)?;
    let placed = place_order(state.pool(), &order).await?;

    forget_cart(&session, placed.order_id).await;

    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_id", &placed.order_id.to_string())]),
    );

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order_id: placed.order_id,
            buyer_id: placed.buyer_id,
            total: placed.total,
            total_display: placed.total.display(),
        }),
    ))
}
