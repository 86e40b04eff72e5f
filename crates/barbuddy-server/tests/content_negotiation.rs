mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{body_json, content_type, setup_app};
use serde_json::json;

fn cocktail_body() -> Body {
    Body::from(
        json!({
            "cocktailname": "Negroni",
            "description": "gin, vermouth, Campari",
            "location": "Bar Basso",
            "rating": 5
        })
        .to_string(),
    )
}

#[tokio::test]
async fn test_get_without_accept_is_not_acceptable() {
    let app = setup_app();

    let response = app
        .send(
            Request::builder()
                .uri("/api/cocktails")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    assert_eq!(content_type(&response), "application/json");
    assert_eq!(
        body_json(response).await,
        json!({"message": "Request must accept application/json responses"})
    );
}

#[tokio::test]
async fn test_unsupported_accept_header() {
    let app = setup_app();

    let response = app
        .send(
            Request::builder()
                .uri("/api/cocktails/1")
                .header("accept", "application/xml")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn test_delete_requires_accept_and_leaves_row() {
    let app = setup_app();
    app.seed_cocktail("Negroni", "gin", "bar", 5);

    let response = app
        .send(
            Request::builder()
                .method("DELETE")
                .uri("/api/cocktails/1")
                .header("accept", "text/html")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    assert_eq!(app.cocktail_count(), 1);
}

#[tokio::test]
async fn test_post_without_content_type_is_unsupported() {
    let app = setup_app();

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/cocktails")
                .header("accept", "application/json")
                .body(cocktail_body())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(content_type(&response), "application/json");
    assert_eq!(
        body_json(response).await,
        json!({"message": "Request must contain application/json data"})
    );
    assert_eq!(app.cocktail_count(), 0);
}

#[tokio::test]
async fn test_put_with_form_content_type_is_unsupported() {
    let app = setup_app();
    app.seed_cocktail("Negroni", "gin", "bar", 5);

    let response = app
        .send(
            Request::builder()
                .method("PUT")
                .uri("/api/cocktails/1")
                .header("accept", "application/json")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(cocktail_body())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_accept_check_runs_before_content_type_check() {
    let app = setup_app();

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/cocktails")
                .header("content-type", "text/plain")
                .body(cocktail_body())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn test_charset_parameter_is_allowed() {
    let app = setup_app();

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/cocktails")
                .header("accept", "text/html, application/json;q=0.8")
                .header("content-type", "application/json; charset=utf-8")
                .body(cocktail_body())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(app.cocktail_count(), 1);
}

#[tokio::test]
async fn test_get_does_not_require_content_type() {
    let app = setup_app();

    let response = app.get_json("/api/cocktails").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_is_not_negotiated() {
    let app = setup_app();

    let response = app
        .send(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_json_refused_with_zero_quality_is_not_acceptable() {
    let app = setup_app();

    let response = app
        .send(
            Request::builder()
                .uri("/api/cocktails")
                .header("accept", "application/json;q=0, text/html")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    assert_eq!(content_type(&response), "application/json");
}

#[tokio::test]
async fn test_unknown_path_is_json_not_found() {
    let app = setup_app();

    let response = app.get_json("/api/mocktails").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(content_type(&response), "application/json");
    assert_eq!(
        body_json(response).await,
        json!({"message": "Could not find resource /api/mocktails"})
    );
}

#[tokio::test]
async fn test_unsupported_method_is_json_method_not_allowed() {
    let app = setup_app();

    let response = app.delete_json("/api/cocktails").await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(content_type(&response), "application/json");
    assert_eq!(
        body_json(response).await,
        json!({"message": "Method DELETE is not allowed on /api/cocktails"})
    );

    let response = app.delete_json("/api/users/1").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(content_type(&response), "application/json");
}
