//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call to the upstream:
//!     → upstream::dispatcher sends the request
//!     → On 429: backoff.rs decides whether and how long to wait
//!     → Loop until success, terminal error, or budget exhausted
//! ```
//!
//! # Design Decisions
//! - Backoff is a pure function of the attempt counter; no shared state
//! - The delay doubles exactly; no jitter, no ceiling
//! - Only 429 is retried; transport errors and other statuses are terminal

pub mod backoff;
