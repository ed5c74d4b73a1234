//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher calls produce:
//!     → tracing events inside the dispatcher's span (host, endpoint, attempt, request_id)
//!     → metrics.rs (attempt / failover / call counters, call latency)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, text or JSON)
//!     → any recorder the owning application installs for `metrics`
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID flows through every attempt of a call
//! - Metrics are cheap (facade no-ops without a recorder)

pub mod logging;
pub mod metrics;
