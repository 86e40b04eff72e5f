#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use barbuddy_db::{create_pool, run_migrations, DbPool, DbSettings};
use barbuddy_server::{app, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// A router backed by a fresh, migrated database in a temp directory.
///
/// The `TempDir` must outlive the router.
pub struct TestApp {
    pub router: Router,
    pub pool: DbPool,
    _dir: TempDir,
}

pub fn setup_app() -> TestApp {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("barbuddy-test.db");
    let pool =
        create_pool(&DbSettings::new(path.display().to_string())).expect("failed to create pool");
    {
        let conn = pool.get().unwrap();
        run_migrations(&conn).unwrap();
    }

    let state = AppState::new(pool.clone()).expect("schemas should compile");
    TestApp {
        router: app(state),
        pool,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get_json(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header("accept", "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn delete_json(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .header("accept", "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn send_json(&self, method: &str, uri: &str, body: &Value) -> Response<Body> {
        self.send(json_request(method, uri, body)).await
    }

    pub fn cocktail_count(&self) -> i64 {
        self.pool
            .get()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM cocktails", [], |row| row.get(0))
            .unwrap()
    }

    pub fn user_count(&self) -> i64 {
        self.pool
            .get()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap()
    }

    pub fn seed_cocktail(&self, name: &str, description: &str, location: &str, rating: i64) {
        self.pool
            .get()
            .unwrap()
            .execute(
                "INSERT INTO cocktails (cocktailname, description, location, rating)
                 VALUES (?1, ?2, ?3, ?4)",
                (name, description, location, rating),
            )
            .unwrap();
    }
}

/// A request with a JSON body that also accepts JSON back.
pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("accept", "application/json")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn content_type(response: &Response<Body>) -> &str {
    response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
}
