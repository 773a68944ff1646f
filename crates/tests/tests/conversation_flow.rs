use std::path::PathBuf;

use agro_api::build_app;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

fn catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../catalog/catalog.json")
}

async fn send(app: &Router, conversation_id: &str, text: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/message")
        .header("content-type", "application/json")
        .header("x-api-key", "dev-agro-key")
        .body(Body::from(
            json!({
                "conversation_id": conversation_id,
                "text": text
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    parsed["reply"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn full_onboarding_and_shipping_round_trip() {
    let app = build_app(catalog_path()).await.expect("app should build");
    let id = Uuid::new_v4().to_string();

    let greeting = send(&app, &id, "!hola").await;
    assert!(greeting.contains("¿Cómo te llamas?"));

    let menu = send(&app, &id, "Carlos").await;
    assert!(menu.contains("Carlos"));
    assert!(menu.contains("1️⃣"));

    let category = send(&app, &id, "1").await;
    assert!(category.contains("FITOPROTECTORES"));

    let ask_location = send(&app, &id, "¿hacen envíos?").await;
    assert!(ask_location.contains("lugar"));

    let saved = send(&app, &id, "Arequipa").await;
    assert!(saved.contains("Arequipa"));

    let confirmed = send(&app, &id, "¿pueden enviar otra vez?").await;
    assert!(confirmed.contains("Arequipa"));
}

#[tokio::test]
async fn classifier_rules_reach_the_wire() {
    let app = build_app(catalog_path()).await.expect("app should build");
    let id = Uuid::new_v4().to_string();

    send(&app, &id, "!hola").await;
    send(&app, &id, "Rosa").await;

    let pricing = send(&app, &id, "precio por favor").await;
    assert!(pricing.contains("Te respondemos en unos minutos"));

    let escalation = send(&app, &id, "mis plantas tienen un virus muy raro").await;
    assert!(escalation.contains("consultar a un ingeniero"));

    let suggestions = send(&app, &id, "tengo problemas con la caída de hojas").await;
    assert!(suggestions.contains("productos"));
}

#[tokio::test]
async fn conversations_do_not_share_state() {
    let app = build_app(catalog_path()).await.expect("app should build");
    let first = Uuid::new_v4().to_string();
    let second = Uuid::new_v4().to_string();

    send(&app, &first, "!hola").await;
    send(&app, &first, "Pedro").await;

    // The second conversation is still unonboarded.
    let reply = send(&app, &second, "menú").await;
    assert!(reply.contains("¿Cómo te llamas?"));
}
