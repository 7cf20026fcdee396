//! Request identity.
//!
//! # Responsibilities
//! - Assign a UUID v4 `x-request-id` to every inbound request that does not
//!   already carry one
//! - Run as early as possible so the ID shows up in all traces
//!
//! # Design Decisions
//! - A client-supplied ID is preserved, never overwritten

use axum::http::{HeaderName, HeaderValue, Request};
use tower::{Layer, Service};
use uuid::Uuid;

/// Name of the request ID header.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Tower layer that attaches a request ID.
#[derive(Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service produced by [`RequestIdLayer`].
#[derive(Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        let name = HeaderName::from_static(X_REQUEST_ID);
        if !request.headers().contains_key(&name) {
            let id = Uuid::new_v4().to_string();
            if let Ok(value) = HeaderValue::from_str(&id) {
                request.headers_mut().insert(name, value);
            }
        }
        self.inner.call(request)
    }
}
