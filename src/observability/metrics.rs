//! Metrics collection.
//!
//! # Metrics
//! - `dispatch_attempts_total` (counter): attempts by host
//! - `dispatch_failovers_total` (counter): transport failures that moved on to another host
//! - `dispatch_calls_total` (counter): finished calls by operation, outcome
//! - `dispatch_call_duration_seconds` (histogram): wall time of a call across all attempts
//!
//! # Design Decisions
//! - Emitted through the `metrics` facade; without an installed recorder every
//!   call is a no-op
//! - Exporters are left to the owning application

use std::time::Instant;

pub fn record_attempt(host: &str) {
    metrics::counter!("dispatch_attempts_total", "host" => host.to_string()).increment(1);
}

pub fn record_failover(host: &str) {
    metrics::counter!("dispatch_failovers_total", "host" => host.to_string()).increment(1);
}

pub fn record_call(operation: &'static str, outcome: &'static str, start: Instant) {
    metrics::counter!("dispatch_calls_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
    metrics::histogram!("dispatch_call_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}
