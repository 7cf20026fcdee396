//! Upstream API access subsystem.
//!
//! # Data Flow
//! ```text
//! Route handler builds an OutboundRequest (authorization mandatory)
//!     → dispatcher.rs (send, classify, retry 429s with backoff)
//!     → DispatchResult (exactly one terminal outcome per call)
//!     → handler shapes the simplified JSON response
//! ```
//!
//! # Design Decisions
//! - One dispatcher instance shared by all handlers; no per-call state
//! - Only 429 is retried; everything else is surfaced to the handler
//! - Requests are immutable; every attempt rebuilds the wire request fresh

pub mod dispatcher;
pub mod request;
pub mod types;

pub use dispatcher::{DispatchResult, Dispatcher, TransportError};
pub use request::{AccessToken, OutboundRequest, RequestBody, UpstreamContext};
