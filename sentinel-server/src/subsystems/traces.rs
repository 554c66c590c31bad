use sentinel_core::error::SentinelError;
use sentinel_core::store::{TraceQuery, TraceStore};

/// Recent traces, newest first, as `{ "traces": [...], "count": n }`.
pub async fn list_recent(
    query: TraceQuery,
    store: &dyn TraceStore,
) -> Result<serde_json::Value, SentinelError> {
    let query = query.clamped();
    let traces = store.recent(&query).await?;

    tracing::debug!(limit = query.limit, returned = traces.len(), "Listed recent traces");

    Ok(serde_json::json!({
        "count": traces.len(),
        "traces": traces,
    }))
}
