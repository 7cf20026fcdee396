//! Shared utilities for integration tests.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use reddit_gateway::config::{RetryConfig, TimeoutConfig, UpstreamConfig};
use reddit_gateway::lifecycle::Shutdown;
use reddit_gateway::upstream::{Dispatcher, UpstreamContext};

/// Start a mock upstream from the given router; returns its bound address.
pub async fn start_upstream(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// An upstream context pointing at a mock upstream.
#[allow(dead_code)]
pub fn upstream_context(addr: SocketAddr) -> UpstreamContext {
    let config = UpstreamConfig {
        base_url: format!("http://{addr}"),
        access_token: "test-token".to_string(),
        user_agent: "gateway-tests".to_string(),
    };
    UpstreamContext::from_config(&config).unwrap()
}

/// A dispatcher with the given retry budget.
#[allow(dead_code)]
pub fn dispatcher(max_attempts: u32, initial_delay_ms: u64, shutdown: Shutdown) -> Dispatcher {
    Dispatcher::new(
        RetryConfig {
            max_attempts,
            initial_delay_ms,
        },
        TimeoutConfig::default(),
        "gateway-tests",
        shutdown,
    )
    .unwrap()
}
