//! The resilient dispatcher.
//!
//! # Responsibilities
//! - Perform one logical outbound call to the upstream API
//! - Classify the outcome: success, client error, transport failure, 429
//! - Retry 429s with exponential backoff under a bounded budget
//!
//! # Design Decisions
//! - Exactly one terminal result per invocation; nothing is dropped silently
//! - Only 429 is retried; transport errors and other statuses never are
//! - Backoff sleeps suspend only the task dispatching that one request
//! - A shutdown signal during a backoff sleep aborts the wait promptly

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::{RetryConfig, TimeoutConfig};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::resilience::backoff;
use crate::upstream::request::{OutboundRequest, RequestBody};

/// Transport-level failure reasons. Never retried.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("dispatch cancelled while waiting to retry")]
    Cancelled,

    #[error("network error: {0}")]
    Network(reqwest::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }
}

/// Terminal outcome of one dispatch call.
#[derive(Debug)]
pub enum DispatchResult {
    /// 2xx from the upstream, body fully read.
    Success { status: StatusCode, body: String },

    /// Retry budget exhausted while the upstream kept answering 429.
    RateLimited,

    /// Any other non-2xx status. Never retried.
    ClientError { status: StatusCode, body: String },

    /// The transport failed before a response was fully read. Never retried.
    TransportFailure { cause: TransportError },
}

/// Per-call retry bookkeeping. Owned by exactly one in-flight dispatch and
/// discarded when it returns.
struct RetryState {
    attempt: u32,
}

impl RetryState {
    fn new() -> Self {
        Self { attempt: 0 }
    }

    fn should_retry(&self, max_attempts: u32) -> bool {
        backoff::should_retry(self.attempt, max_attempts)
    }

    fn next_delay(&self, initial_delay: Duration) -> Duration {
        backoff::next_delay(self.attempt, initial_delay)
    }

    fn record_retry(&mut self) {
        self.attempt += 1;
    }
}

/// Issues outbound calls, transparently retrying upstream rate limits.
///
/// Holds no state shared across calls; concurrent dispatches never contend.
pub struct Dispatcher {
    client: reqwest::Client,
    retry: RetryConfig,
    shutdown: Shutdown,
}

impl Dispatcher {
    /// Build a dispatcher with its own connection pool and timeouts.
    pub fn new(
        retry: RetryConfig,
        timeouts: TimeoutConfig,
        user_agent: &str,
        shutdown: Shutdown,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .build()?;

        Ok(Self {
            client,
            retry,
            shutdown,
        })
    }

    /// Perform one logical call against the upstream.
    ///
    /// Returns exactly one terminal result. At most `max_attempts` backoff
    /// sleeps happen, so at most `max_attempts + 1` outbound calls are made;
    /// no call goes out once the budget is exhausted.
    pub async fn dispatch(&self, request: OutboundRequest) -> DispatchResult {
        let mut shutdown_rx = self.shutdown.subscribe();
        let mut state = RetryState::new();
        let initial_delay = self.retry.initial_delay();

        loop {
            let (status, body) = match self.send_once(&request).await {
                Ok(outcome) => outcome,
                Err(cause) => {
                    tracing::warn!(
                        method = %request.method(),
                        url = %request.url(),
                        error = %cause,
                        "Upstream transport failure"
                    );
                    return DispatchResult::TransportFailure { cause };
                }
            };

            if status.is_success() {
                return DispatchResult::Success { status, body };
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                if !state.should_retry(self.retry.max_attempts) {
                    tracing::warn!(
                        url = %request.url(),
                        calls = state.attempt + 1,
                        "Retry budget exhausted, upstream still rate limiting"
                    );
                    metrics::record_rate_limited(request.url().path());
                    return DispatchResult::RateLimited;
                }

                let delay = state.next_delay(initial_delay);
                tracing::info!(
                    url = %request.url(),
                    attempt = state.attempt,
                    delay = ?delay,
                    "Upstream rate limited, backing off"
                );
                metrics::record_retry(request.url().path());

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown_rx.recv() => {
                        return DispatchResult::TransportFailure {
                            cause: TransportError::Cancelled,
                        };
                    }
                }

                state.record_retry();
                continue;
            }

            tracing::debug!(
                url = %request.url(),
                status = %status,
                "Upstream returned an error status"
            );
            return DispatchResult::ClientError { status, body };
        }
    }

    /// One outbound attempt. The body is fully read before returning so the
    /// caller never sees a partially-read response.
    async fn send_once(
        &self,
        request: &OutboundRequest,
    ) -> Result<(StatusCode, String), TransportError> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone());

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }

        builder = match request.body() {
            Some(RequestBody::Form(fields)) => builder.form(fields),
            Some(RequestBody::Json(value)) => builder.json(value),
            None => builder,
        };

        let response = builder.send().await.map_err(TransportError::from)?;
        let status = response.status();
        let body = response.text().await.map_err(TransportError::from)?;
        Ok((status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_state_walks_the_doubling_schedule() {
        let mut state = RetryState::new();
        let base = Duration::from_millis(100);

        assert_eq!(state.next_delay(base), Duration::from_millis(100));
        state.record_retry();
        assert_eq!(state.next_delay(base), Duration::from_millis(200));
        state.record_retry();
        assert_eq!(state.next_delay(base), Duration::from_millis(400));
    }

    #[test]
    fn retry_state_respects_the_budget() {
        let mut state = RetryState::new();
        assert!(state.should_retry(2));
        state.record_retry();
        assert!(state.should_retry(2));
        state.record_retry();
        assert!(!state.should_retry(2));
    }
}
