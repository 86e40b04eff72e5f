//! User registration handlers.
//!
//! Only signup and public profile lookup are exposed. There is no login
//! endpoint: no session or token scheme has been settled on.

use crate::api::{with_session, ApiError, JsonBody, ResourceId};
use crate::AppState;
use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use barbuddy_users::{get_user, hash_password, register_user, PublicUser, SignupPayload};
use std::sync::Arc;

pub fn user_location(id: i64) -> String {
    format!("/api/users/{id}")
}

/// POST /api/signup
pub async fn signup_handler(
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let payload: SignupPayload = state.signup_schema.parse(body)?;

    // Argon2 runs before the transaction so the write lock is not held for it.
    let password = payload.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("task join error: {e}")))??;

    let user =
        with_session(&state, move |tx| Ok(register_user(tx, &payload, &password_hash)?)).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, user_location(user.id))],
        Json(user.public_view()),
    ))
}

/// GET /api/users/:id
pub async fn get_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> Result<Json<PublicUser>, ApiError> {
    let user = with_session(&state, move |tx| Ok(get_user(tx, id)?)).await?;
    Ok(Json(user.public_view()))
}
