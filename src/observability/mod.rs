//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging with the request ID on every edge event
//! - Metrics are cheap (atomic updates behind the metrics facade)
//! - `RUST_LOG` overrides the configured level for ad-hoc debugging

pub mod logging;
pub mod metrics;
