//! Owner sign-in and password management.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use endulque_core::OwnerId;

use crate::error::{AppError, Result};
use crate::middleware::{
    OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin,
};
use crate::services::auth::validate_password;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

/// The signed-in owner as shown to the client. The access token stays on
/// the server.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: OwnerId,
    pub email: String,
}

/// Sign in with email and password.
#[instrument(skip(state, session, req), fields(email = %req.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<MeResponse>> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest("email and password are required".to_string()));
    }

    let admin = state.auth().sign_in(&req.email, &req.password).await?;
    set_current_admin(&session, &admin).await?;

    tracing::info!(user_id = %admin.user_id, "Owner signed in");
    Ok(Json(MeResponse {
        user_id: admin.user_id,
        email: admin.email,
    }))
}

/// Sign out. The provider session is revoked on a best-effort basis; the
/// local session is always cleared.
pub async fn logout(
    State(state): State<AppState>,
    OptionalAdminAuth(admin): OptionalAdminAuth,
    session: Session,
) -> Result<StatusCode> {
    if let Some(admin) = admin
        && let Err(e) = state.auth().sign_out(&admin.access_token).await
    {
        tracing::warn!(error = %e, "Provider sign-out failed");
    }
    clear_current_admin(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Send a recovery email.
///
/// Always answers 204 so the endpoint does not reveal which emails have
/// accounts.
#[instrument(skip(state, req))]
pub async fn password_reset(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> StatusCode {
    if !req.email.trim().is_empty()
        && let Err(e) = state.auth().send_password_reset(&req.email).await
    {
        tracing::warn!(error = %e, "Password reset request failed");
    }
    StatusCode::NO_CONTENT
}

/// Change the owner's password.
pub async fn password_update(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Json(req): Json<PasswordRequest>,
) -> Result<StatusCode> {
    validate_password(&req.password)?;
    state
        .auth()
        .update_password(&admin.access_token, &req.password)
        .await?;
    tracing::info!(user_id = %admin.user_id, "Owner password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// Current owner.
pub async fn me(RequireAdminAuth(admin): RequireAdminAuth) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: admin.user_id,
        email: admin.email,
    })
}
