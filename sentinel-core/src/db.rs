use crate::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

pub async fn health_check(pool: &PgPool) -> Result<String, sqlx::Error> {
    let row: (String,) = sqlx::query_as("SELECT version()").fetch_one(pool).await?;
    Ok(row.0)
}

/// Create the append-only trace table and its lookup indexes if missing.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS agent_traces (
            id UUID PRIMARY KEY,
            session_id TEXT NOT NULL,
            timestamp TIMESTAMPTZ NOT NULL,
            prompt TEXT NOT NULL,
            response_text TEXT NOT NULL,
            grounding_metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
            is_hallucinated BOOLEAN NOT NULL,
            is_stale BOOLEAN NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS agent_traces_session_idx ON agent_traces (session_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS agent_traces_timestamp_idx ON agent_traces (timestamp DESC)")
        .execute(pool)
        .await?;

    Ok(())
}
