use std::sync::Arc;

use clap::Parser;
use sentinel_core::provider::{GeminiClient, GroundedProvider, UnavailableProvider};
use sentinel_core::store::PgTraceStore;
use sentinel_core::SentinelConfig;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use sentinel_server::router::ServiceContext;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "sentinel.toml")]
    config: String,

    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let config = match SentinelConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging: RUST_LOG wins, otherwise service.log_level
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level)),
        )
        .init();

    // Connect to DB
    let pool = match sentinel_core::db::create_pool(&config.database).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if args.health {
        match sentinel_core::db::health_check(&pool).await {
            Ok(v) => println!("✅ PostgreSQL connected: {}", v),
            Err(e) => {
                println!("❌ PostgreSQL connection failed: {}", e);
                std::process::exit(1);
            }
        }

        match GeminiClient::from_config(&config.provider) {
            Ok(_) => println!("✅ Gemini provider configured: {}", config.provider.model),
            Err(e) => println!("⚠️  Gemini provider unavailable: {}", e),
        }

        println!("✅ Agent Control Room health check passed");
        return Ok(());
    }

    sentinel_core::db::ensure_schema(&pool).await?;

    let provider: Arc<dyn GroundedProvider> = match GeminiClient::from_config(&config.provider) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::warn!("Queries disabled: failed to create Gemini client: {}", e);
            Arc::new(UnavailableProvider::new(e.to_string()))
        }
    };

    let ctx = ServiceContext {
        provider,
        store: Arc::new(PgTraceStore::new(pool)),
        staleness: config.staleness.evaluator()?,
    };

    tracing::info!(
        threshold_days = config.staleness.threshold_days,
        policy = ?config.staleness.policy,
        "Staleness evaluator configured"
    );

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    sentinel_server::http::start_http_server(ctx, config.http.clone(), tx.subscribe()).await?;

    Ok(())
}
