//! Content-negotiation middleware.
//!
//! The API only speaks `application/json`. These checks are layered per
//! route and short-circuit before the handler runs; they never touch the
//! store.

use crate::api::ApiError;
use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

const JSON_MEDIA_TYPE: &str = "application/json";

/// Rejects with 406 unless `Accept` lists `application/json`.
pub async fn require_json_accept(req: Request, next: Next) -> Response {
    if !accepts_json(req.headers()) {
        tracing::debug!(uri = %req.uri(), "request does not accept json");
        return ApiError::NotAcceptable.into_response();
    }
    next.run(req).await
}

/// Rejects with 415 unless `Content-Type` is `application/json`.
pub async fn require_json_content(req: Request, next: Next) -> Response {
    if !sends_json(req.headers()) {
        tracing::debug!(uri = %req.uri(), "request body is not json");
        return ApiError::UnsupportedMediaType.into_response();
    }
    next.run(req).await
}

/// True if any `Accept` entry is exactly `application/json` with a non-zero
/// quality. Wildcards such as `*/*` do not count.
fn accepts_json(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|entry| {
            let mut parts = entry.split(';');
            let essence = parts.next().unwrap_or_default().trim();
            essence.eq_ignore_ascii_case(JSON_MEDIA_TYPE) && !has_zero_quality(parts)
        })
}

fn has_zero_quality<'a>(params: impl Iterator<Item = &'a str>) -> bool {
    params
        .filter_map(|param| param.split_once('='))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
        .any(|(_, value)| value.trim().parse::<f32>().is_ok_and(|q| q == 0.0))
}

fn sends_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE))
}
