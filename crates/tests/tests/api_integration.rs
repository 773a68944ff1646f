use std::path::PathBuf;

use agro_api::build_app;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

fn catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../catalog/catalog.json")
}

#[tokio::test]
async fn health_is_public_and_reports_catalog_size() {
    let app = build_app(catalog_path()).await.expect("app should build");

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["status"], "ok");
    assert!(parsed["catalog_entries"].as_u64().unwrap() > 0);
    assert!(parsed.get("metrics").is_some());
}

#[tokio::test]
async fn message_requires_api_key() {
    let app = build_app(catalog_path()).await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/message")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "conversation_id": "51999000111",
                "text": "hola"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn message_returns_reply_payload() {
    let app = build_app(catalog_path()).await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/message")
        .header("content-type", "application/json")
        .header("x-api-key", "dev-agro-key")
        .body(Body::from(
            json!({
                "conversation_id": "51999000111",
                "text": "!hola"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(parsed["reply"].as_str().unwrap().contains("AGRO MONTES"));
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let app = build_app(catalog_path()).await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/message")
        .header("content-type", "application/json")
        .header("x-api-key", "dev-agro-key")
        .body(Body::from(
            json!({
                "conversation_id": "51999000111",
                "text": "   "
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
