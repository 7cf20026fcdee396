//! Reddit Content Gateway
//!
//! A thin HTTP gateway in front of the Reddit OAuth REST API, built with
//! Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                     GATEWAY                       │
//!                    │                                                   │
//!   Client Request   │  ┌─────────┐    ┌──────────┐    ┌─────────────┐  │
//!   ─────────────────┼─▶│  http   │───▶│ handlers │───▶│  upstream   │  │
//!                    │  │ server  │    │  (glue)  │    │ dispatcher  │──┼──▶ Reddit API
//!                    │  └─────────┘    └──────────┘    └──────┬──────┘  │
//!                    │                                        │         │
//!                    │                                 ┌──────▼──────┐  │
//!                    │                                 │ resilience  │  │
//!                    │                                 │  (backoff)  │  │
//!                    │                                 └─────────────┘  │
//!                    │                                                   │
//!                    │  ┌────────────────────────────────────────────┐  │
//!                    │  │  config  ·  observability  ·  lifecycle    │  │
//!                    │  └────────────────────────────────────────────┘  │
//!                    └──────────────────────────────────────────────────┘
//! ```
//!
//! The dispatcher is the single outbound entry point: it sends one logical
//! call, retries 429s with exponential backoff under a bounded budget, and
//! returns exactly one classified result to the handler.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use reddit_gateway::config::loader::load_config;
use reddit_gateway::http::HttpServer;
use reddit_gateway::lifecycle::Shutdown;
use reddit_gateway::observability;

#[derive(Parser)]
#[command(name = "reddit-gateway")]
#[command(about = "HTTP gateway in front of the Reddit OAuth API", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "gateway.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    observability::logging::init(&config.observability);

    tracing::info!("reddit-gateway v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        max_attempts = config.retries.max_attempts,
        initial_delay_ms = config.retries.initial_delay_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received");
                shutdown.trigger();
            }
        });
    }

    let server = HttpServer::new(config, shutdown)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
