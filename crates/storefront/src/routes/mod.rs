//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness check
//! GET    /health/ready              - Readiness check (database)
//!
//! # Menu
//! GET    /api/menu                  - Menu grouped by category (cached)
//! GET    /api/menu/{product_id}     - Product detail
//!
//! # Cart (session)
//! GET    /api/cart                  - Current cart
//! DELETE /api/cart                  - Empty the cart
//! POST   /api/cart/items            - Add an item
//! PATCH  /api/cart/items/{index}    - Change an item's quantity
//! DELETE /api/cart/items/{index}    - Remove an item
//!
//! # Checkout
//! POST   /api/checkout              - Place the order (strict rate limit)
//! ```

pub mod cart;
pub mod checkout;
pub mod menu;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};

use crate::middleware::{api_rate_limiter, checkout_rate_limiter};
use crate::state::AppState;

/// Create the menu routes router.
pub fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(menu::index))
        .route("/{product_id}", get(menu::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{index}", patch(cart::update).delete(cart::remove))
}

/// Create the API router.
pub fn api_routes() -> Router<AppState> {
    let checkout = Router::new()
        .route("/checkout", post(checkout::checkout))
        .layer(checkout_rate_limiter());

    Router::new()
        .nest("/menu", menu_routes())
        .nest("/cart", cart_routes())
        .merge(checkout)
        .layer(api_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
