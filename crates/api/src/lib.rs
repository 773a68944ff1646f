mod rate_limit;

use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use agro_agents::Dispatcher;
use agro_catalog::Catalog;
use agro_core::{BotConfig, InboundMessage};
use agro_observability::AppMetrics;
use agro_storage::MemorySessionStore;
use anyhow::Result;
use axum::extract::{Json, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{body::Body, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::rate_limit::IpRateLimiter;

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<Dispatcher<MemorySessionStore>>,
    pub metrics: Arc<AppMetrics>,
    pub api_key: String,
    pub limiter: IpRateLimiter,
    pub allowed_origins: Arc<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    catalog_entries: usize,
    metrics: agro_observability::MetricsSnapshot,
}

#[derive(Debug, Deserialize)]
struct MessageRequest {
    conversation_id: String,
    text: String,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    reply: String,
}

pub async fn build_app(catalog_path: impl AsRef<Path>) -> Result<Router> {
    let metrics = AppMetrics::shared();
    let catalog = Arc::new(Catalog::load_or_empty(catalog_path));

    let max_sessions = env::var("AGRO_MAX_SESSIONS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(10_000);
    let session_ttl_seconds = env::var("AGRO_SESSION_TTL_SECONDS")
        .ok()
        .and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(60 * 60 * 24);
    let store = Arc::new(MemorySessionStore::new(
        max_sessions,
        chrono::Duration::seconds(session_ttl_seconds),
    ));

    let agent = Arc::new(Dispatcher::new(
        catalog,
        BotConfig::from_env(),
        store,
        metrics.clone(),
    ));

    spawn_session_purge(agent.clone());

    let api_key = env::var("AGRO_API_KEY").unwrap_or_else(|_| "dev-agro-key".to_string());
    let rate_limit_window = Duration::from_secs(
        env::var("AGRO_API_RATE_LIMIT_WINDOW_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(60),
    );
    let rate_limit_max = env::var("AGRO_API_RATE_LIMIT_MAX")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(80);
    let allowed_origins = env::var("AGRO_ALLOWED_ORIGINS")
        .ok()
        .map(|raw| {
            raw.split(',')
                .map(|origin| origin.trim().trim_end_matches('/').to_string())
                .filter(|origin| !origin.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let state = ApiState {
        agent,
        metrics,
        api_key,
        limiter: IpRateLimiter::new(rate_limit_window, rate_limit_max),
        allowed_origins: Arc::new(allowed_origins),
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/message", post(message))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(16 * 1024))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

fn spawn_session_purge(agent: Arc<Dispatcher<MemorySessionStore>>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60 * 60));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match agent.purge_expired_sessions() {
                Ok(removed) if removed > 0 => {
                    tracing::info!(removed, "purged idle sessions");
                }
                Ok(_) => {}
                Err(error) => tracing::warn!(%error, "session purge failed"),
            }
        }
    });
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let origins = if origins.is_empty() {
        vec![HeaderValue::from_static("http://localhost:5500")]
    } else {
        origins
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-api-key"),
        ])
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        catalog_entries: state.agent.catalog().len(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn message(
    State(state): State<ApiState>,
    Json(request): Json<MessageRequest>,
) -> impl IntoResponse {
    if request.conversation_id.trim().is_empty() || request.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "invalid_request",
                "message": "conversation_id and text are required"
            })),
        )
            .into_response();
    }

    let inbound = InboundMessage {
        conversation_id: request.conversation_id,
        text: request.text,
    };
    let reply = state.agent.handle_message(&inbound);
    (StatusCode::OK, Json(MessageResponse { reply })).into_response()
}

async fn api_key_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if request.method() == Method::OPTIONS || is_public_endpoint(path) {
        return next.run(request).await;
    }

    let header_key = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if header_key != state.api_key {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "unauthorized",
                "message": "missing or invalid x-api-key"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || is_public_endpoint(request.uri().path()) {
        return next.run(request).await;
    }

    let ip = request_ip(&request);
    if !state.limiter.allow(&ip) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "rate_limited",
                "message": "rate limit exceeded for this IP"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

fn is_public_endpoint(path: &str) -> bool {
    matches!(path, "/health")
}

fn request_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .next()
                .unwrap_or("unknown")
                .trim()
                .to_string()
        })
        .unwrap_or_else(|| "local".to_string())
}
