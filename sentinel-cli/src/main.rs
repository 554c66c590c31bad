//! sentinel-cli: operator CLI for the Agent Control Room
//!
//! Talks to the HTTP API of `sentinel-server`.
//!
//! # Subcommands
//! - `ask <prompt> [--session <id>] [--json]`: run one grounded query
//! - `traces [-n <limit>] [--session <id>] [--json]`: list recent traces
//! - `status`: show server health

use clap::{Parser, Subcommand};
use serde::Deserialize;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";
const DEFAULT_LIMIT: u32 = 20;
const DEFAULT_SESSION: &str = "cli";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "sentinel-cli",
    version,
    about = "Agent Control Room: grounded queries and trace inspection"
)]
struct Cli {
    /// Server URL (overrides SENTINEL_HTTP_URL env var)
    #[arg(long, env = "SENTINEL_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ask the grounded agent a question and record the trace
    Ask {
        /// Prompt to send
        prompt: String,

        /// Session the trace is grouped under
        #[arg(long, default_value = DEFAULT_SESSION)]
        session: String,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// List recent traces, newest first
    Traces {
        /// Maximum number of traces to return
        #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,

        /// Only traces from this session
        #[arg(long)]
        session: Option<String>,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Show server status
    Status,
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SourceView {
    pub uri: Option<String>,
    #[serde(default)]
    pub title: String,
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct GroundingView {
    #[serde(default)]
    pub search_queries: Vec<String>,
    #[serde(default)]
    pub sources: Vec<SourceView>,
}

/// Response from POST /query
#[derive(Debug, Deserialize)]
pub struct AskResponse {
    pub trace_id: String,
    pub response: String,
    #[serde(default)]
    pub grounding_metadata: GroundingView,
    pub is_hallucinated: bool,
    pub is_stale: bool,
    pub sources_count: usize,
    pub confidence_score: f64,
    pub warning: Option<String>,
    pub ghost_citation: Option<u32>,
}

/// One stored trace from GET /traces
#[derive(Debug, Deserialize)]
pub struct TraceView {
    pub id: String,
    pub session_id: String,
    pub timestamp: String,
    pub prompt: String,
    pub is_hallucinated: bool,
    pub is_stale: bool,
    #[serde(default)]
    pub grounding_metadata: GroundingView,
}

#[derive(Debug, Deserialize)]
pub struct TracesResponse {
    pub traces: Vec<TraceView>,
    pub count: usize,
}

// ============================================================================
// Formatting
// ============================================================================

/// One-word verdict label.
pub fn verdict_label(is_hallucinated: bool, is_stale: bool) -> &'static str {
    match (is_hallucinated, is_stale) {
        (true, _) => "UNGROUNDED",
        (false, true) => "STALE",
        (false, false) => "GROUNDED",
    }
}

/// First 8 hex chars of a UUID.
pub fn short_id(id: &str) -> String {
    id.replace('-', "").chars().take(8).collect()
}

/// First line of `text`, capped at `max` chars.
pub fn headline(text: &str, max: usize) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if line.chars().count() > max {
        let cut: String = line.chars().take(max).collect();
        format!("{}…", cut.trim_end())
    } else {
        line.to_string()
    }
}

pub fn format_ask(resp: &AskResponse) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", resp.response.trim_end()));
    out.push_str(&format!(
        "[{}] trace #{}  sources: {}  confidence: {:.0}%\n",
        verdict_label(resp.is_hallucinated, resp.is_stale),
        short_id(&resp.trace_id),
        resp.sources_count,
        resp.confidence_score * 100.0
    ));
    for (i, source) in resp.grounding_metadata.sources.iter().enumerate() {
        let title = if source.title.is_empty() { "(untitled)" } else { &source.title };
        let date = source.published_at.as_deref().unwrap_or("undated");
        out.push_str(&format!(
            "  [{}] {} <{}> ({})\n",
            i + 1,
            title,
            source.uri.as_deref().unwrap_or("no uri"),
            date
        ));
    }
    if let Some(warning) = &resp.warning {
        out.push_str(&format!("⚠️  {}\n", warning));
    }
    if let Some(n) = resp.ghost_citation {
        out.push_str(&format!("⚠️  response cites [{}] but only {} sources exist\n", n, resp.sources_count));
    }
    out
}

pub fn format_trace_line(trace: &TraceView) -> String {
    format!(
        "#{}  {}  {:<10}  {:>2} src  [{}] {}",
        short_id(&trace.id),
        trace.timestamp,
        verdict_label(trace.is_hallucinated, trace.is_stale),
        trace.grounding_metadata.sources.len(),
        trace.session_id,
        headline(&trace.prompt, 60)
    )
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

fn client(timeout_secs: u64) -> anyhow::Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()?)
}

fn check_status(resp: reqwest::blocking::Response) -> reqwest::blocking::Response {
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        eprintln!("sentinel-cli: server returned {}: {}", status, body);
        std::process::exit(1);
    }
    resp
}

/// Run one grounded query via POST /query.
fn do_ask(server: &str, prompt: &str, session: &str, json_output: bool) -> anyhow::Result<()> {
    // Provider calls with search grounding can be slow.
    let client = client(120)?;
    let url = format!("{}/query", server);
    let body = serde_json::json!({ "prompt": prompt, "session_id": session });

    let resp = match client.post(&url).json(&body).send() {
        Ok(r) => check_status(r),
        Err(e) => {
            eprintln!("sentinel-cli: connection failed to {}: {}", url, e);
            std::process::exit(1);
        }
    };

    if json_output {
        let raw: serde_json::Value = resp.json()?;
        println!("{}", serde_json::to_string_pretty(&raw)?);
        return Ok(());
    }

    let ask: AskResponse = match resp.json() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("sentinel-cli: failed to parse query response: {}", e);
            std::process::exit(1);
        }
    };
    print!("{}", format_ask(&ask));
    Ok(())
}

/// List recent traces via GET /traces.
fn do_traces(server: &str, limit: u32, session: Option<&str>, json_output: bool) -> anyhow::Result<()> {
    let client = client(30)?;
    let url = format!("{}/traces", server);

    let mut query: Vec<(&str, String)> = vec![("limit", limit.to_string())];
    if let Some(s) = session {
        query.push(("session_id", s.to_string()));
    }

    let resp = match client.get(&url).query(&query).send() {
        Ok(r) => check_status(r),
        Err(e) => {
            eprintln!("sentinel-cli: connection failed to {}: {}", url, e);
            std::process::exit(1);
        }
    };

    if json_output {
        let raw: serde_json::Value = resp.json()?;
        println!("{}", serde_json::to_string_pretty(&raw)?);
        return Ok(());
    }

    let listed: TracesResponse = resp.json()?;
    if listed.count == 0 {
        eprintln!("No traces recorded yet");
        return Ok(());
    }
    for trace in &listed.traces {
        println!("{}", format_trace_line(trace));
    }
    Ok(())
}

/// Show the server status by calling GET /health.
fn do_status(server: &str) -> anyhow::Result<()> {
    let client = client(10)?;
    let url = format!("{}/health", server);

    match client.get(&url).send() {
        Ok(r) if r.status().is_success() => {
            let body: serde_json::Value = r.json().unwrap_or_default();
            println!("Control room: {}", body["status"].as_str().unwrap_or("unknown"));
            println!("Version:      {}", body["version"].as_str().unwrap_or("?"));
            println!("Store:        {}", body["store"].as_str().unwrap_or("?"));
            println!("Provider:     {}", body["provider"].as_str().unwrap_or("?"));
        }
        Ok(r) => {
            eprintln!("sentinel-cli: server unhealthy (HTTP {})", r.status());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("sentinel-cli: cannot reach {}: {}", url, e);
            std::process::exit(1);
        }
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();

    let result = match cli.command {
        Commands::Ask { prompt, session, json } => do_ask(&server, &prompt, &session, json),
        Commands::Traces { limit, session, json } => {
            do_traces(&server, limit, session.as_deref(), json)
        }
        Commands::Status => do_status(&server),
    };

    if let Err(e) = result {
        eprintln!("sentinel-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ask_response(is_hallucinated: bool, is_stale: bool) -> AskResponse {
        serde_json::from_value(serde_json::json!({
            "trace_id": "7b5c24ab-1234-5678-9abc-def012345678",
            "response": "Rust 1.85 shipped the 2024 edition [1].\n",
            "grounding_metadata": {
                "search_queries": ["rust 2024 edition"],
                "sources": [
                    { "uri": "https://blog.rust-lang.org/2025/02/20/Rust-1.85.0.html", "title": "Announcing Rust 1.85.0", "published_at": "2025-02-20T00:00:00Z" },
                    { "title": "" }
                ],
                "supports": []
            },
            "is_hallucinated": is_hallucinated,
            "is_stale": is_stale,
            "sources_count": 2,
            "confidence_score": 0.48,
            "warning": "Unverified data: no grounding supports",
            "ghost_citation": null,
            "took_ms": 812
        }))
        .expect("ask response should parse")
    }

    #[test]
    fn test_verdict_labels() {
        assert_eq!(verdict_label(true, false), "UNGROUNDED");
        assert_eq!(verdict_label(true, true), "UNGROUNDED");
        assert_eq!(verdict_label(false, true), "STALE");
        assert_eq!(verdict_label(false, false), "GROUNDED");
    }

    #[test]
    fn test_short_id_strips_dashes() {
        assert_eq!(short_id("7b5c24ab-1234-5678-9abc-def012345678"), "7b5c24ab");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_headline_uses_first_nonempty_line_and_truncates() {
        assert_eq!(headline("\n\nFirst real line\nSecond", 60), "First real line");
        assert_eq!(headline(&"A".repeat(100), 10), format!("{}…", "A".repeat(10)));
        assert_eq!(headline("", 10), "");
    }

    #[test]
    fn test_format_ask_lists_sources_and_warning() {
        let out = format_ask(&ask_response(false, true));
        assert!(out.starts_with("Rust 1.85 shipped the 2024 edition [1].\n\n"));
        assert!(out.contains("[STALE] trace #7b5c24ab"));
        assert!(out.contains("confidence: 48%"));
        assert!(out.contains("[1] Announcing Rust 1.85.0"));
        assert!(out.contains("[2] (untitled) <no uri> (undated)"));
        assert!(out.contains("Unverified data"));
        assert!(!out.contains("but only"));
    }

    #[test]
    fn test_format_ask_reports_ghost_citation() {
        let mut resp = ask_response(false, false);
        resp.ghost_citation = Some(5);
        assert!(format_ask(&resp).contains("cites [5] but only 2 sources exist"));
    }

    #[test]
    fn test_trace_line() {
        let trace: TraceView = serde_json::from_value(serde_json::json!({
            "id": "deadbeef-cafe-babe-face-feeddeadbeef",
            "session_id": "cli",
            "timestamp": "2026-10-18T09:30:00Z",
            "prompt": "What changed in Rust 1.85?\nextra",
            "response_text": "ignored",
            "is_hallucinated": true,
            "is_stale": false,
            "grounding_metadata": { "search_queries": [], "sources": [], "supports": [] }
        }))
        .unwrap();

        let line = format_trace_line(&trace);
        assert!(line.starts_with("#deadbeef  2026-10-18T09:30:00Z  UNGROUNDED"));
        assert!(line.ends_with("[cli] What changed in Rust 1.85?"));
    }
}
