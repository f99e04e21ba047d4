use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use careerscope::config::AppConfig;
use careerscope::db;
use careerscope::http::{AppState, HttpServer};
use careerscope::ratelimit::RateLimiter;
use careerscope::stats::StatsService;

/// Job-market statistics API server.
#[derive(Debug, Parser)]
#[command(name = "careerscope", version, about)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    info!("Starting Careerscope Statistics Service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.listen_addr.set_port(port);
    }
    let addr = config.server.listen_addr;
    info!(listen_addr = %addr, "Configuration loaded");

    // Connect to the database
    let pool = db::connect(&config.database).await?;

    // Initialize the rate limiter
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limiting.max_requests,
        config.rate_limiting.window(),
    ));
    info!(
        max_requests = config.rate_limiting.max_requests,
        window_secs = config.rate_limiting.window_secs,
        "Rate limiter initialized"
    );

    if !config.security.api_keys.is_empty() {
        info!(keys = config.security.api_keys.len(), "API key check enabled");
    }

    // Create and start the HTTP server
    let state = AppState {
        stats: StatsService::new(pool),
        limiter,
        config: Arc::new(config),
    };
    let server = HttpServer::new(addr, state);

    info!("Starting HTTP server on {}", addr);

    // Run the server with graceful shutdown on Ctrl+C
    server.serve_with_shutdown(shutdown_signal()).await?;

    info!("Careerscope Statistics Service stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
