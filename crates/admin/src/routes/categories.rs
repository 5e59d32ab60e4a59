//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use endulque_core::CategoryId;

use crate::db::CategoryRepository;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::{Category, CategoryInput};
use crate::state::AppState;

pub async fn index(
    State(state): State<AppState>,
    _: RequireAdminAuth,
) -> Result<Json<Vec<Category>>> {
    let rows = CategoryRepository::new(state.pool())
        .list(state.owner_id())
        .await?;
    Ok(Json(rows))
}

pub async fn create(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>)> {
    let input = input.validate()?;
    let category = CategoryRepository::new(state.pool())
        .create(state.owner_id(), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Path(id): Path<CategoryId>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>> {
    let input = input.validate()?;
    let category = CategoryRepository::new(state.pool())
        .rename(state.owner_id(), id, &input)
        .await?;
    Ok(Json(category))
}

/// Delete a category; its products stay, uncategorized.
pub async fn delete(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    CategoryRepository::new(state.pool())
        .delete(state.owner_id(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
