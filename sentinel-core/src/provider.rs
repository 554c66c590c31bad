//! LLM/search provider for grounded generation.
//!
//! Provides a `GroundedProvider` trait with one implementation:
//! - **Gemini**: `generateContent` with the Google Search tool enabled
//!
//! The provider hands back the response text and the raw, untyped grounding
//! payload. Interpreting that payload is the extractor's job.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;

use crate::config::ProviderConfig;

// ============================================================================
// GroundedProvider trait
// ============================================================================

/// What the provider returned for one prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub text: String,
    /// Raw grounding payload; `Value::Null` when the provider attached none.
    pub grounding: serde_json::Value,
}

/// Abstraction over search-grounded LLM providers.
#[async_trait]
pub trait GroundedProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// Error types
// ============================================================================

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Provider returned no candidates")]
    EmptyResponse,

    #[error("Missing API key")]
    MissingApiKey,

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("All {attempts} attempts failed: {last_error}")]
    RetryExhausted { attempts: usize, last_error: String },
}

impl From<reqwest::Error> for ProviderError {
    // Request URLs never reach error text or logs.
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Http(e.without_url())
    }
}

// ============================================================================
// Config types
// ============================================================================

/// Gemini client configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
}

impl GeminiConfig {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        let api_key = api_key
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .unwrap_or_default();

        Self {
            api_key,
            model,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl From<&ProviderConfig> for GeminiConfig {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_seconds),
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
            ..Self::new(config.api_key.clone(), config.model.clone())
        }
    }
}

// ============================================================================
// Gemini API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<GeminiContent>,
    tools: Vec<GeminiTool>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiTool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    // Kept untyped: the extractor owns its interpretation.
    #[serde(default)]
    grounding_metadata: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    code: u16,
    message: String,
}

// ============================================================================
// GeminiClient
// ============================================================================

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini client: calls `generateContent` with Google Search grounding.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        Self::with_base_url(
            config,
            "https://generativelanguage.googleapis.com/v1beta".to_string(),
        )
    }

    /// Create a client with a custom base URL (for testing / proxies)
    pub fn with_base_url(config: GeminiConfig, base_url: String) -> Result<Self, ProviderError> {
        if config.api_key.is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            config,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Self::with_base_url(GeminiConfig::from(config), config.base_url.clone())
    }

    async fn generate_once(&self, prompt: &str) -> Result<ProviderResponse, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.config.model);

        let request = GenerateRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            tools: vec![GeminiTool {
                google_search: GoogleSearch {},
            }],
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let error_detail = serde_json::from_str::<GeminiErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error);

            let (code, message) = error_detail
                .map(|e| (e.code, e.message))
                .unwrap_or((status.as_u16(), error_body));

            tracing::error!(code = code, message = %message, "Gemini API error");

            return Err(ProviderError::Api { code, message });
        }

        let body: GenerateResponse = response.json().await?;

        let candidate = body
            .candidates
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(ProviderResponse {
            text,
            grounding: candidate.grounding_metadata,
        })
    }
}

#[async_trait]
impl GroundedProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError> {
        let retry_strategy = ExponentialBackoff::from_millis(self.config.retry_delay_ms)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.config.max_retries);

        let result = Retry::spawn(retry_strategy, || self.generate_once(prompt)).await;

        // The first call is not a retry.
        let attempts = self.config.max_retries + 1;

        result.map_err(|e| {
            tracing::error!(attempts = attempts, error = %e, "All Gemini generate attempts failed");
            ProviderError::RetryExhausted {
                attempts,
                last_error: e.to_string(),
            }
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// ============================================================================
// UnavailableProvider
// ============================================================================

/// Stands in when no real provider could be configured. Every call fails,
/// so queries are rejected while manual logging keeps working.
#[derive(Debug, Clone)]
pub struct UnavailableProvider {
    reason: String,
}

impl UnavailableProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl GroundedProvider for UnavailableProvider {
    async fn generate(&self, _prompt: &str) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::Unavailable(self.reason.clone()))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

// ============================================================================
// TESTS
// ============================================================================
