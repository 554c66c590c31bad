use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SentinelError;

pub const PROTOCOL: &str = "sentinel/1";

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SentinelRequest {
    Ping,
    Health,
    /// Full cycle: provider call, extraction, verdicts, assembly, persistence.
    Query {
        prompt: Option<String>,
        session_id: Option<String>,
    },
    /// Manual logging of an already-formed trace, bypassing the provider.
    LogTrace {
        payload: serde_json::Value,
    },
    RecentTraces {
        limit: Option<u32>,
        since: Option<DateTime<Utc>>,
        session_id: Option<String>,
    },
}

/// Failure class carried back to the boundary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Provider,
    Persistence,
    Internal,
}

impl From<&SentinelError> for ErrorKind {
    fn from(error: &SentinelError) -> Self {
        match error {
            SentinelError::Validation(_) => ErrorKind::Validation,
            SentinelError::Provider(_) => ErrorKind::Provider,
            SentinelError::Store(_) | SentinelError::Database(_) => ErrorKind::Persistence,
            SentinelError::Config(_) | SentinelError::Io(_) | SentinelError::Other(_) => {
                ErrorKind::Internal
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SentinelResponse {
    pub status: String,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub kind: Option<ErrorKind>,
    pub version: String,
}

impl SentinelResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            status: "ok".to_string(),
            data: Some(data),
            error: None,
            kind: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn err(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            error: Some(msg.into()),
            kind: Some(kind),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn from_error(error: &SentinelError) -> Self {
        Self::err(ErrorKind::from(error), error.to_string())
    }

    pub fn pong() -> Self {
        Self::ok(serde_json::json!({"pong": true}))
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
