//! Cocktail resource handlers.
//!
//! Each handler validates its input, does its store work inside one
//! transaction, and answers with JSON. Create and update return the entity
//! together with a `Location` header pointing at it.

use crate::api::{with_session, ApiError, JsonBody, ResourceId};
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use barbuddy_cocktails::{
    create_cocktail, delete_cocktail, get_cocktail, list_cocktails, update_cocktail, Cocktail,
    CocktailError, CocktailFilters, CocktailPayload,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Path at which a cocktail can be retrieved.
pub fn cocktail_location(id: i64) -> String {
    format!("/api/cocktails/{id}")
}

/// POST /api/cocktails
pub async fn create_cocktail_handler(
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let payload: CocktailPayload = state.cocktail_schema.parse(body)?;

    let cocktail = with_session(&state, move |tx| Ok(create_cocktail(tx, &payload)?)).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, cocktail_location(cocktail.id))],
        Json(cocktail),
    ))
}

/// GET /api/cocktails/:id
pub async fn get_cocktail_handler(
    Extension(state): Extension<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> Result<Json<Cocktail>, ApiError> {
    let cocktail = with_session(&state, move |tx| {
        get_cocktail(tx, id).map_err(|e| match e {
            CocktailError::NotFound(id) => {
                ApiError::NotFound(format!("Could not find post with id {id}"))
            }
            other => other.into(),
        })
    })
    .await?;

    Ok(Json(cocktail))
}

/// GET /api/cocktails
///
/// Supports `cocktailname_like`, `description_like`, and `location_like`.
pub async fn list_cocktails_handler(
    Extension(state): Extension<Arc<AppState>>,
    filters: Result<Query<CocktailFilters>, QueryRejection>,
) -> Result<Json<Vec<Cocktail>>, ApiError> {
    let Query(filters) = filters.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let cocktails = with_session(&state, move |tx| Ok(list_cocktails(tx, &filters)?)).await?;

    Ok(Json(cocktails))
}

/// PUT /api/cocktails/:id
///
/// Full replacement: all four mutable fields are required and overwritten.
pub async fn update_cocktail_handler(
    Extension(state): Extension<Arc<AppState>>,
    ResourceId(id): ResourceId,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let payload: CocktailPayload = state.cocktail_schema.parse(body)?;

    let cocktail =
        with_session(&state, move |tx| Ok(update_cocktail(tx, id, &payload)?)).await?;

    Ok((
        StatusCode::OK,
        [(header::LOCATION, cocktail_location(cocktail.id))],
        Json(cocktail),
    ))
}

/// DELETE /api/cocktails/:id
pub async fn delete_cocktail_handler(
    Extension(state): Extension<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> Result<Json<Value>, ApiError> {
    with_session(&state, move |tx| Ok(delete_cocktail(tx, id)?)).await?;

    tracing::info!(cocktail_id = id, "cocktail deleted");
    Ok(Json(json!({
        "message": format!("Cocktail {id} has been deleted")
    })))
}
