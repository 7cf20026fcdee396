//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all gateway routes and static assets
//! - Wire up middleware (timeout, tracing, request ID, metrics)
//! - Construct the shared dispatcher and upstream context
//! - Serve with graceful shutdown

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::request::RequestIdLayer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::upstream::request::UpstreamConfigError;
use crate::upstream::{Dispatcher, UpstreamContext};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub upstream: Arc<UpstreamContext>,
}

/// Errors building the gateway from its configuration.
#[derive(Debug, Error)]
pub enum GatewayInitError {
    #[error("invalid upstream configuration: {0}")]
    Upstream(#[from] UpstreamConfigError),

    #[error("failed to build the upstream HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    shutdown: Shutdown,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig, shutdown: Shutdown) -> Result<Self, GatewayInitError> {
        let upstream = Arc::new(UpstreamContext::from_config(&config.upstream)?);
        let dispatcher = Arc::new(Dispatcher::new(
            config.retries,
            config.timeouts,
            &config.upstream.user_agent,
            shutdown.clone(),
        )?);

        let state = AppState {
            dispatcher,
            upstream,
        };
        let router = Self::build_router(&config, state);

        Ok(Self { router, shutdown })
    }

    /// Build the Axum router with all routes and middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let assets = Path::new(&config.assets.directory);

        Router::new()
            .route("/popular", get(handlers::popular_subreddits))
            .route("/posts", get(handlers::subreddit_posts))
            .route("/autocomplete", post(handlers::autocomplete_subreddits))
            .route("/submit", post(handlers::submit_post))
            .route("/friend", put(handlers::add_friend))
            .route("/unfriend", delete(handlers::remove_friend))
            .route_service("/", ServeFile::new(assets.join("index.html")))
            .nest_service("/static", ServeDir::new(assets))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(track_metrics))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let mut shutdown_rx = self.shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Record method, route, status and latency for every inbound request.
async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request.uri().path().to_string();

    let response = next.run(request).await;

    metrics::record_request(&method, &route, response.status().as_u16(), start);
    response
}
