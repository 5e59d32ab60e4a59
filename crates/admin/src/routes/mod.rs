//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness check
//! GET    /health/ready                        - Readiness check (database)
//!
//! # Auth
//! POST   /auth/login                          - Owner sign-in
//! POST   /auth/logout                         - Sign out
//! POST   /auth/password/reset                 - Send recovery email (always 204)
//! POST   /auth/password/update                - Change password
//! GET    /auth/me                             - Current owner
//!
//! # Catalog (all require auth)
//! GET    /api/categories                      - List categories
//! POST   /api/categories                      - Create category
//! PUT    /api/categories/{id}                 - Rename category
//! DELETE /api/categories/{id}                 - Delete category
//! GET    /api/products                        - List products (?category_id=)
//! POST   /api/products                        - Create product
//! GET    /api/products/{id}                   - Product with options
//! PUT    /api/products/{id}                   - Update product
//! POST   /api/products/{id}/image             - Upload product image
//! GET    /api/products/{id}/variants          - List variants
//! POST   /api/products/{id}/variants          - Add variant
//! PUT    /api/variants/{id}                   - Update variant
//! DELETE /api/variants/{id}                   - Delete variant
//! GET    /api/products/{id}/add-ons           - List add-ons
//! POST   /api/products/{id}/add-ons           - Add add-on
//! PUT    /api/add-ons/{id}                    - Update add-on
//! DELETE /api/add-ons/{id}                    - Delete add-on
//! GET    /api/products/{id}/ready-dates       - List ready dates
//! POST   /api/products/{id}/ready-dates       - Add ready date
//! DELETE /api/ready-dates/{id}                - Delete ready date
//! POST   /api/menu/delete                     - Delete product and its images
//!
//! # Orders
//! GET    /api/orders                          - List orders (?status=)
//! GET    /api/orders/{id}                     - Order detail
//! PATCH  /api/orders/{id}/status              - Change status
//!
//! # Settings
//! GET    /api/settings/profile                - Owner profile
//! PUT    /api/settings/profile                - Update owner profile
//! POST   /api/settings/menu-image             - Upload menu image
//! ```

pub mod auth;
pub mod categories;
pub mod menu;
pub mod options;
pub mod orders;
pub mod products;
pub mod settings;

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, patch, post, put},
};

use crate::error::{AppError, Result};
use crate::services::StorageClient;
use crate::state::AppState;

/// Multipart overhead allowed on top of the image itself.
const MULTIPART_SLACK_BYTES: usize = 64 * 1024;

/// Pull the first file field out of an upload.
///
/// The content type is checked before the body is read.
pub(crate) async fn read_image(
    mut multipart: Multipart,
    storage: &StorageClient,
) -> Result<(String, Bytes)> {
    while let Some(field) = multipart.next_field().await? {
        if field.file_name().is_none() {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        // Size 1 stands in for "not empty" until the body is read.
        storage.validate(&content_type, 1)?;
        let bytes = field.bytes().await?;
        return Ok((content_type, bytes));
    }
    Err(AppError::BadRequest("no file in upload".to_string()))
}

/// Owner authentication routes.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/password/reset", post(auth::password_reset))
        .route("/password/update", post(auth::password_update))
        .route("/me", get(auth::me))
}

/// Catalog routes.
pub fn catalog_routes(upload_limit: usize) -> Router<AppState> {
    let uploads = Router::new()
        .route("/products/{id}/image", post(products::upload_image))
        .layer(DefaultBodyLimit::max(upload_limit + MULTIPART_SLACK_BYTES));

    Router::new()
        .route("/categories", get(categories::index).post(categories::create))
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::delete),
        )
        .route("/products", get(products::index).post(products::create))
        .route("/products/{id}", get(products::show).put(products::update))
        .route(
            "/products/{id}/variants",
            get(options::list_variants).post(options::create_variant),
        )
        .route(
            "/variants/{id}",
            put(options::update_variant).delete(options::delete_variant),
        )
        .route(
            "/products/{id}/add-ons",
            get(options::list_add_ons).post(options::create_add_on),
        )
        .route(
            "/add-ons/{id}",
            put(options::update_add_on).delete(options::delete_add_on),
        )
        .route(
            "/products/{id}/ready-dates",
            get(options::list_ready_dates).post(options::create_ready_date),
        )
        .route(
            "/ready-dates/{id}",
            axum::routing::delete(options::delete_ready_date),
        )
        .route("/menu/delete", post(menu::delete))
        .merge(uploads)
}

/// Order routes.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", patch(orders::update_status))
}

/// Settings routes.
pub fn settings_routes(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(settings::profile).put(settings::update_profile),
        )
        .route(
            "/menu-image",
            post(settings::upload_menu_image)
                .layer(DefaultBodyLimit::max(upload_limit + MULTIPART_SLACK_BYTES)),
        )
}

/// Create all routes for admin.
pub fn routes(upload_limit: usize) -> Router<AppState> {
    let api = Router::new()
        .merge(catalog_routes(upload_limit))
        .nest("/orders", order_routes())
        .nest("/settings", settings_routes(upload_limit));

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/auth", auth_routes())
        .nest("/api", api)
}

/// Liveness health check endpoint.
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
