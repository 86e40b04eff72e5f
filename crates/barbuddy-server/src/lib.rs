//! BarBuddy HTTP server library logic.

pub mod api;
pub mod api_cocktails;
pub mod api_users;
pub mod config;
pub mod middleware;

use api::ApiError;
use axum::{
    extract::DefaultBodyLimit,
    http::{Method, StatusCode, Uri},
    routing::{get, post, put},
    Extension, Json, Router,
};
use barbuddy_cocktails::cocktail_schema;
use barbuddy_db::DbPool;
use barbuddy_types::{PayloadSchema, SchemaError};
use barbuddy_users::signup_schema;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
pub struct AppState {
    /// Database connection pool; each request checks out one connection.
    pub pool: DbPool,
    /// Compiled schema for cocktail create/replace bodies.
    pub cocktail_schema: PayloadSchema,
    /// Compiled schema for signup bodies.
    pub signup_schema: PayloadSchema,
}

impl AppState {
    /// Builds the state, compiling the request schemas once.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidDefinition` if a built-in schema does
    /// not compile.
    pub fn new(pool: DbPool) -> Result<Self, SchemaError> {
        Ok(Self {
            pool,
            cocktail_schema: PayloadSchema::compile(cocktail_schema())?,
            signup_schema: PayloadSchema::compile(signup_schema())?,
        })
    }
}

/// Maximum request body size (1 MiB).
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn unknown_route(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("Could not find resource {}", uri.path()))
}

async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::Rejected {
        status: StatusCode::METHOD_NOT_ALLOWED,
        message: format!("Method {method} is not allowed on {}", uri.path()),
    }
}

/// Builds the application router with all routes.
///
/// Content negotiation is layered per method: every `/api` route requires
/// `Accept: application/json`, and routes with a body also require
/// `Content-Type: application/json`. The Accept check runs first. Unknown
/// paths and unsupported methods answer with `{"message"}` JSON too.
pub fn app(state: AppState) -> Router {
    let accept_json = axum::middleware::from_fn(middleware::require_json_accept);
    let json_body = axum::middleware::from_fn(middleware::require_json_content);

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/cocktails",
            post(api_cocktails::create_cocktail_handler)
                .route_layer(json_body.clone())
                .get(api_cocktails::list_cocktails_handler)
                .route_layer(accept_json.clone()),
        )
        .route(
            "/api/cocktails/{id}",
            put(api_cocktails::update_cocktail_handler)
                .route_layer(json_body.clone())
                .get(api_cocktails::get_cocktail_handler)
                .delete(api_cocktails::delete_cocktail_handler)
                .route_layer(accept_json.clone()),
        )
        .route(
            "/api/signup",
            post(api_users::signup_handler)
                .route_layer(json_body)
                .route_layer(accept_json.clone()),
        )
        .route(
            "/api/users/{id}",
            get(api_users::get_user_handler).route_layer(accept_json),
        )
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(unknown_route)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
