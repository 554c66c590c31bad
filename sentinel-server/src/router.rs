use std::sync::Arc;

use crate::subsystems::{log_trace, query, traces};
use sentinel_core::error::SentinelError;
use sentinel_core::protocol::{ErrorKind, SentinelRequest, SentinelResponse};
use sentinel_core::provider::GroundedProvider;
use sentinel_core::staleness::StalenessEvaluator;
use sentinel_core::store::{TraceQuery, TraceStore, DEFAULT_RECENT_LIMIT};

/// Collaborators every request is served with. Holds no per-request state.
#[derive(Clone)]
pub struct ServiceContext {
    pub provider: Arc<dyn GroundedProvider>,
    pub store: Arc<dyn TraceStore>,
    pub staleness: StalenessEvaluator,
}

pub async fn handle_request(request: SentinelRequest, ctx: &ServiceContext) -> SentinelResponse {
    match request {
        SentinelRequest::Ping => SentinelResponse::pong(),
        SentinelRequest::Health => match ctx.store.health().await {
            Ok(backend) => SentinelResponse::ok(serde_json::json!({
                "status": "healthy",
                "store": backend,
                "provider": ctx.provider.name(),
            })),
            Err(e) => SentinelResponse::err(
                ErrorKind::Persistence,
                format!("Store health check failed: {}", e),
            ),
        },
        SentinelRequest::Query { prompt, session_id } => {
            match query::run_query(
                prompt,
                session_id,
                ctx.provider.as_ref(),
                ctx.store.as_ref(),
                &ctx.staleness,
            )
            .await
            {
                Ok(response) => match serde_json::to_value(&response) {
                    Ok(data) => SentinelResponse::ok(data),
                    Err(e) => SentinelResponse::err(ErrorKind::Internal, e.to_string()),
                },
                Err(e) => error_response(e),
            }
        }
        SentinelRequest::LogTrace { payload } => {
            match log_trace::log_trace(payload, ctx.store.as_ref(), &ctx.staleness).await {
                Ok(trace) => SentinelResponse::ok(serde_json::json!({
                    "status": "recorded",
                    "id": trace.id(),
                })),
                Err(e) => error_response(e),
            }
        }
        SentinelRequest::RecentTraces {
            limit,
            since,
            session_id,
        } => {
            let query = TraceQuery {
                limit: limit.unwrap_or(DEFAULT_RECENT_LIMIT),
                since,
                session_id,
            };
            match traces::list_recent(query, ctx.store.as_ref()).await {
                Ok(data) => SentinelResponse::ok(data),
                Err(e) => error_response(e),
            }
        }
    }
}

fn error_response(error: SentinelError) -> SentinelResponse {
    let response = SentinelResponse::from_error(&error);
    match response.kind {
        Some(ErrorKind::Validation) => tracing::debug!(error = %error, "Rejected request"),
        _ => tracing::error!(error = %error, "Request failed"),
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::provider::UnavailableProvider;
    use sentinel_core::store::MemoryTraceStore;

    fn context() -> ServiceContext {
        ServiceContext {
            provider: Arc::new(UnavailableProvider::new("no key")),
            store: Arc::new(MemoryTraceStore::new()),
            staleness: StalenessEvaluator::default(),
        }
    }

    #[tokio::test]
    async fn test_ping() {
        let response = handle_request(SentinelRequest::Ping, &context()).await;
        assert!(response.is_ok());
        assert_eq!(response.data.unwrap()["pong"], true);
    }

    #[tokio::test]
    async fn test_provider_failure_is_reported_as_provider_error() {
        let ctx = context();
        let response = handle_request(
            SentinelRequest::Query {
                prompt: Some("p".to_string()),
                session_id: Some("s".to_string()),
            },
            &ctx,
        )
        .await;

        assert!(!response.is_ok());
        assert_eq!(response.kind, Some(ErrorKind::Provider));
        let traces = ctx.store.recent(&TraceQuery::default()).await.unwrap();
        assert!(traces.is_empty(), "failed queries must not leave traces");
    }

    #[tokio::test]
    async fn test_log_then_list() {
        let ctx = context();
        let logged = handle_request(
            SentinelRequest::LogTrace {
                payload: serde_json::json!({
                    "prompt": "p",
                    "session_id": "router-test",
                    "response_text": "r"
                }),
            },
            &ctx,
        )
        .await;
        assert!(logged.is_ok(), "{:?}", logged.error);
        assert_eq!(logged.data.as_ref().unwrap()["status"], "recorded");

        let listed = handle_request(
            SentinelRequest::RecentTraces {
                limit: None,
                since: None,
                session_id: Some("router-test".to_string()),
            },
            &ctx,
        )
        .await;
        let data = listed.data.unwrap();
        assert_eq!(data["count"], 1);
        assert_eq!(data["traces"][0]["is_hallucinated"], true);
    }
}
