//! Agent Control Room HTTP API
//!
//! Axum-based HTTP server exposing the query cycle, manual trace logging and
//! trace inspection.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to a pure
//! inner function. The inner functions are directly testable without axum dispatch
//! machinery.
//!
//! Endpoints:
//! - GET  /: service banner
//! - GET  /health: health check with store status
//! - GET  /version: server version info
//! - POST /query: ask the grounded agent and trace the answer
//! - POST /log-trace: record an externally produced trace
//! - GET  /traces: recent traces, newest first

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use sentinel_core::config::HttpConfig;
use sentinel_core::protocol::{ErrorKind, SentinelRequest, SentinelResponse, PROTOCOL};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::router::{handle_request, ServiceContext};

/// Build the Axum router with all endpoints
pub fn build_router(ctx: Arc<ServiceContext>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/query", post(query_handler))
        .route("/log-trace", post(log_trace_handler))
        .route("/traces", get(traces_handler))
        .with_state(ctx)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    ctx: ServiceContext,
    config: HttpConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);

    let app = build_router(Arc::new(ctx));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Agent Control Room listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct QueryRequest {
    pub prompt: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TracesParams {
    pub limit: Option<u32>,
    pub since: Option<DateTime<Utc>>,
    pub session_id: Option<String>,
}

// ============================================================================
// Inner (directly testable) functions
// ============================================================================

/// Inner root: static banner (pure, no IO).
pub fn root_inner() -> serde_json::Value {
    serde_json::json!({
        "message": "Agent Control Room - Phase 1: Log Engine",
        "status": "operational",
    })
}

/// Inner version: returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": PROTOCOL,
    })
}

/// Inner health: asks the store whether it is reachable.
pub async fn health_inner(ctx: &ServiceContext) -> (StatusCode, serde_json::Value) {
    let (status, mut body) = response_to_http(handle_request(SentinelRequest::Health, ctx).await);
    if let Some(obj) = body.as_object_mut() {
        obj.insert("version".to_string(), serde_json::json!(env!("CARGO_PKG_VERSION")));
        if status != StatusCode::OK {
            obj.insert("status".to_string(), serde_json::json!("unhealthy"));
        }
    }
    (status, body)
}

/// Inner query: runs one full query cycle.
pub async fn query_inner(ctx: &ServiceContext, req: QueryRequest) -> (StatusCode, serde_json::Value) {
    let start = Instant::now();

    let request = SentinelRequest::Query {
        prompt: req.prompt,
        session_id: req.session_id,
    };
    let (status, mut body) = response_to_http(handle_request(request, ctx).await);

    if status == StatusCode::OK {
        if let Some(obj) = body.as_object_mut() {
            obj.insert(
                "took_ms".to_string(),
                serde_json::json!(start.elapsed().as_millis() as u64),
            );
        }
    }

    (status, body)
}

/// Inner log-trace: records an externally produced trace.
pub async fn log_trace_inner(
    ctx: &ServiceContext,
    payload: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    response_to_http(handle_request(SentinelRequest::LogTrace { payload }, ctx).await)
}

/// Inner traces: recency query.
pub async fn traces_inner(ctx: &ServiceContext, params: TracesParams) -> (StatusCode, serde_json::Value) {
    let request = SentinelRequest::RecentTraces {
        limit: params.limit,
        since: params.since,
        session_id: params.session_id,
    };
    response_to_http(handle_request(request, ctx).await)
}

// ============================================================================
// Axum handler wrappers (thin, delegate to inner functions)
// ============================================================================

pub async fn root_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(root_inner()))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn health_handler(State(ctx): State<Arc<ServiceContext>>) -> impl IntoResponse {
    let (status, body) = health_inner(&ctx).await;
    (status, Json(body))
}

pub async fn query_handler(
    State(ctx): State<Arc<ServiceContext>>,
    Json(req): Json<QueryRequest>,
) -> impl IntoResponse {
    let (status, body) = query_inner(&ctx, req).await;
    (status, Json(body))
}

pub async fn log_trace_handler(
    State(ctx): State<Arc<ServiceContext>>,
    Json(payload): Json<serde_json::Value>,
) -> impl IntoResponse {
    let (status, body) = log_trace_inner(&ctx, payload).await;
    (status, Json(body))
}

pub async fn traces_handler(
    State(ctx): State<Arc<ServiceContext>>,
    Query(params): Query<TracesParams>,
) -> impl IntoResponse {
    let (status, body) = traces_inner(&ctx, params).await;
    (status, Json(body))
}

// ============================================================================
// Helpers
// ============================================================================

/// HTTP status for a failed request, by failure class.
pub fn status_for(kind: Option<ErrorKind>) -> StatusCode {
    match kind {
        Some(ErrorKind::Validation) => StatusCode::BAD_REQUEST,
        Some(ErrorKind::Provider) => StatusCode::BAD_GATEWAY,
        Some(ErrorKind::Persistence) => StatusCode::SERVICE_UNAVAILABLE,
        Some(ErrorKind::Internal) | None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert a `SentinelResponse` into an HTTP status and body.
pub fn response_to_http(response: SentinelResponse) -> (StatusCode, serde_json::Value) {
    if response.is_ok() {
        (
            StatusCode::OK,
            response.data.unwrap_or(serde_json::json!({})),
        )
    } else {
        (
            status_for(response.kind),
            serde_json::json!({
                "error": response.error.unwrap_or_else(|| "unknown error".to_string()),
                "kind": response.kind,
                "status": "error",
            }),
        )
    }
}

// ============================================================================
// Unit Tests: call inner functions directly
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::provider::{GeminiClient, GeminiConfig, UnavailableProvider};
    use sentinel_core::staleness::StalenessEvaluator;
    use sentinel_core::store::MemoryTraceStore;

    fn context() -> ServiceContext {
        ServiceContext {
            provider: Arc::new(UnavailableProvider::new("Missing API key")),
            store: Arc::new(MemoryTraceStore::new()),
            staleness: StalenessEvaluator::default(),
        }
    }

    #[test]
    fn test_version_inner_pure() {
        let v = version_inner();
        assert!(v["version"].is_string(), "version must be string");
        assert_eq!(v["protocol"], "sentinel/1");
    }

    #[test]
    fn test_root_inner_is_operational() {
        assert_eq!(root_inner()["status"], "operational");
    }

    #[test]
    fn test_response_to_http_ok() {
        let resp = SentinelResponse::ok(serde_json::json!({"count": 0}));
        let (status, body) = response_to_http(resp);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
    }

    #[test]
    fn test_response_to_http_ok_no_data() {
        let mut resp = SentinelResponse::ok(serde_json::json!({}));
        resp.data = None;
        let (_, body) = response_to_http(resp);
        assert!(body.is_object());
    }

    #[test]
    fn test_response_to_http_error_statuses() {
        let cases = [
            (ErrorKind::Validation, StatusCode::BAD_REQUEST),
            (ErrorKind::Provider, StatusCode::BAD_GATEWAY),
            (ErrorKind::Persistence, StatusCode::SERVICE_UNAVAILABLE),
            (ErrorKind::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (kind, expected) in cases {
            let (status, body) = response_to_http(SentinelResponse::err(kind, "boom"));
            assert_eq!(status, expected);
            assert_eq!(body["error"], "boom");
            assert_eq!(body["status"], "error");
        }
    }

    #[test]
    fn test_response_to_http_error_no_message() {
        let mut resp = SentinelResponse::err(ErrorKind::Internal, "x");
        resp.error = None;
        let (_, body) = response_to_http(resp);
        assert_eq!(body["error"], "unknown error");
    }

    #[tokio::test]
    async fn test_health_inner_with_memory_store() {
        let (status, body) = health_inner(&context()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_query_inner_missing_prompt_is_400() {
        let req = QueryRequest {
            prompt: None,
            session_id: Some("s".to_string()),
        };
        let (status, body) = query_inner(&context(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");
    }

    #[tokio::test]
    async fn test_query_inner_without_provider_is_502() {
        let req = QueryRequest {
            prompt: Some("What is new in Rust?".to_string()),
            session_id: Some("s".to_string()),
        };
        let (status, body) = query_inner(&context(), req).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("Missing API key"));
    }

    #[tokio::test]
    async fn test_query_inner_connection_failure_hides_api_key() {
        let config = GeminiConfig {
            api_key: "SUPER-SECRET-KEY".to_string(),
            model: "gemini-2.5-pro".to_string(),
            timeout: std::time::Duration::from_secs(5),
            max_retries: 0,
            retry_delay_ms: 10,
        };
        // Nothing listens on port 1.
        let client = GeminiClient::with_base_url(config, "http://127.0.0.1:1".to_string()).unwrap();
        let ctx = ServiceContext {
            provider: Arc::new(client),
            ..context()
        };

        let req = QueryRequest {
            prompt: Some("What is new in Rust?".to_string()),
            session_id: Some("s".to_string()),
        };
        let (status, body) = query_inner(&ctx, req).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["kind"], "provider");
        let text = body.to_string();
        assert!(!text.contains("SUPER-SECRET-KEY"), "key leaked: {}", text);
        assert!(text.contains("All 1 attempts failed"), "body: {}", text);
    }

    #[tokio::test]
    async fn test_log_trace_inner_records() {
        let ctx = context();
        let (status, body) = log_trace_inner(
            &ctx,
            serde_json::json!({ "prompt": "p", "session_id": "s", "response_text": "r" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "recorded");
        assert!(body["id"].is_string());

        let (status, body) = traces_inner(&ctx, TracesParams::default()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
    }
}
