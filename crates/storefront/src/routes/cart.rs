//! Cart route handlers.
//!
//! The cart is kept in the session. Items are resolved against the catalog
//! when added; clients only send ids and quantities.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use endulque_core::{AddOnId, Price, ProductId, VariantId};

use crate::db::MenuRepository;
use crate::error::{Result, add_breadcrumb};
use crate::models::{CartItem, SessionCart, session_keys};
use crate::state::AppState;

/// Cart as returned to the client.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: i32,
    pub total: Price,
    pub total_display: String,
}

/// One cart line as returned to the client.
#[derive(Debug, Serialize)]
pub struct CartItemView {
    /// Position in the cart, used by the update and remove endpoints.
    pub index: usize,
    #[serde(flatten)]
    pub item: CartItem,
    pub subtotal: Price,
}

impl From<&SessionCart> for CartView {
    fn from(cart: &SessionCart) -> Self {
        let total = cart.total();
        Self {
            items: cart
                .items
                .iter()
                .enumerate()
                .map(|(index, item)| CartItemView {
                    index,
                    item: item.clone(),
                    subtotal: item.subtotal(),
                })
                .collect(),
            item_count: cart.item_count(),
            total,
            total_display: total.display(),
        }
    }
}

/// Add-on selection in an add-to-cart request.
#[derive(Debug, Deserialize)]
pub struct AddOnSelection {
    pub add_on_id: AddOnId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[serde(default)]
    pub add_ons: Vec<AddOnSelection>,
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Read the cart from the session; a missing cart is empty.
pub(crate) async fn load_cart(session: &Session) -> Result<SessionCart> {
    Ok(session
        .get::<SessionCart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Write the cart back to the session.
pub(crate) async fn save_cart(session: &Session, cart: &SessionCart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/cart`
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// `POST /api/cart/items`
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartView>)> {
    let product = MenuRepository::new(state.pool())
        .get_product(state.owner_id(), req.product_id)
        .await?;

    let add_ons: Vec<(AddOnId, i32)> = req
        .add_ons
        .iter()
        .map(|a| (a.add_on_id, a.quantity))
        .collect();
    let item = CartItem::resolve(&product, req.variant_id, req.quantity, &add_ons)?;

    let mut cart = load_cart(&session).await?;
    cart.add(item)?;
    save_cart(&session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", &req.product_id.to_string())]),
    );
    Ok((StatusCode::CREATED, Json(CartView::from(&cart))))
}

/// `PATCH /api/cart/items/{index}`
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Path(index): Path<usize>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.set_quantity(index, req.quantity)?;
    save_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

/// `DELETE /api/cart/items/{index}`
#[instrument(skip(session))]
pub async fn remove(session: Session, Path(index): Path<usize>) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.remove(index)?;
    save_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

/// `DELETE /api/cart`
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<StatusCode> {
    session.remove::<SessionCart>(session_keys::CART).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_request_defaults() {
        let req: AddItemRequest = serde_json::from_str(
            r#"{"product_id": 1, "variant_id": 2, "add_ons": [{"add_on_id": 3}]}"#,
        )
        .unwrap();
        assert_eq!(req.quantity, 1);
        assert_eq!(req.add_ons[0].quantity, 1);
    }

    #[test]
    fn test_cart_view_indexes_and_totals() {
        let cart = SessionCart {
            items: vec![CartItem {
                product_id: ProductId::new(1),
                product_name: "Bolu".to_string(),
                variant_id: VariantId::new(2),
                variant_name: "Kecil".to_string(),
                quantity: 2,
                unit_price: Price::from_units(10_000),
                add_ons: Vec::new(),
            }],
        };
        let view = CartView::from(&cart);
        assert_eq!(view.items[0].index, 0);
        assert_eq!(view.items[0].subtotal, Price::from_units(20_000));
        assert_eq!(view.total_display, "Rp 20.000");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["items"][0]["product_name"], "Bolu");
    }
}
