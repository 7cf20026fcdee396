//! HTTP edge subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → server.rs (Axum router, timeout, trace, request ID, metrics)
//!     → handlers.rs (validate input, build OutboundRequest, dispatch)
//!     → response.rs (shape success JSON / map DispatchResult to status)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
