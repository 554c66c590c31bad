//! Grounding extraction: provider payload -> canonical [`GroundingMetadata`].
//!
//! The provider's grounding payload is loosely typed and may be partially
//! missing. Everything downstream reads the canonical shape produced here,
//! so defaults are applied once, at this boundary:
//!
//! - missing or null payload -> empty metadata
//! - missing lists -> empty lists
//! - chunks with neither URI nor title -> skipped
//! - unparseable date signals -> `published_at = None`
//!
//! Both the REST (camelCase) and SDK (snake_case) key spellings are read, as
//! are the canonical `sources` / `supports` keys, so a stored canonical record
//! extracts back to itself.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::dates;
use crate::models::{GroundingMetadata, Source};

const QUERY_KEYS: &[&str] = &["webSearchQueries", "web_search_queries", "search_queries"];
const CHUNK_KEYS: &[&str] = &["groundingChunks", "grounding_chunks", "sources"];
const SUPPORT_KEYS: &[&str] = &["groundingSupports", "grounding_supports", "supports"];
const CHUNK_BODY_KEYS: &[&str] = &["web", "retrievedContext", "retrieved_context"];

/// The payload has a shape that cannot hold grounding at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed grounding payload: expected an object, got {found}")]
pub struct MalformedPayload {
    pub found: &'static str,
}

/// Extract canonical grounding, degrading a malformed payload to empty metadata.
pub fn extract(raw: &Value) -> GroundingMetadata {
    match try_extract(raw) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unusable grounding payload");
            GroundingMetadata::default()
        }
    }
}

/// Extract canonical grounding, reporting a payload that is not an object.
pub fn try_extract(raw: &Value) -> Result<GroundingMetadata, MalformedPayload> {
    let obj = match raw {
        Value::Null => return Ok(GroundingMetadata::default()),
        Value::Object(obj) => obj,
        other => {
            return Err(MalformedPayload {
                found: json_kind(other),
            })
        }
    };

    let metadata = GroundingMetadata {
        search_queries: search_queries(obj),
        sources: first_array(obj, CHUNK_KEYS)
            .iter()
            .filter_map(source_from_chunk)
            .collect(),
        supports: first_array(obj, SUPPORT_KEYS).to_vec(),
    };

    tracing::debug!(
        queries = metadata.search_queries.len(),
        sources = metadata.sources.len(),
        supports = metadata.supports.len(),
        "Extracted grounding metadata"
    );

    Ok(metadata)
}

fn search_queries(obj: &Map<String, Value>) -> Vec<String> {
    first_array(obj, QUERY_KEYS)
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect()
}

fn source_from_chunk(chunk: &Value) -> Option<Source> {
    let chunk = chunk.as_object()?;
    let body = CHUNK_BODY_KEYS
        .iter()
        .find_map(|k| chunk.get(*k).and_then(Value::as_object))
        .unwrap_or(chunk);

    let uri = non_empty_str(body, "uri");
    let title = non_empty_str(body, "title").unwrap_or_default();
    if uri.is_none() && title.is_empty() {
        return None;
    }

    let published_at = uri.as_deref().and_then(|uri| {
        dates::explicit_date(body)
            .or_else(|| dates::explicit_date(chunk))
            .or_else(|| dates::embedded_date(&format!("{} {}", uri, title)))
    });

    Some(Source {
        uri,
        title,
        published_at,
    })
}

fn first_array<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> &'a [Value] {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn non_empty_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
