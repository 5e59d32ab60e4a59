//! Owner profile settings.

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;

use super::read_image;
use crate::db::ProfileRepository;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::{OwnerProfile, ProfileInput};
use crate::services::catalog;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MenuImage {
    pub menu_image_url: String,
}

pub async fn profile(
    State(state): State<AppState>,
    _: RequireAdminAuth,
) -> Result<Json<OwnerProfile>> {
    Ok(Json(
        ProfileRepository::new(state.pool())
            .get(state.owner_id())
            .await?,
    ))
}

pub async fn update_profile(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    Json(input): Json<ProfileInput>,
) -> Result<Json<OwnerProfile>> {
    let input = input.validate()?;
    Ok(Json(
        ProfileRepository::new(state.pool())
            .upsert(state.owner_id(), &input)
            .await?,
    ))
}

/// Replace the menu board image; the old object is removed.
pub async fn upload_menu_image(
    State(state): State<AppState>,
    _: RequireAdminAuth,
    multipart: Multipart,
) -> Result<Json<MenuImage>> {
    let (content_type, bytes) = read_image(multipart, state.storage()).await?;
    let menu_image_url = catalog::replace_menu_image(
        state.pool(),
        state.storage(),
        state.owner_id(),
        &content_type,
        bytes,
    )
    .await?;
    Ok(Json(MenuImage { menu_image_url }))
}
