//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every host must be an absolute http/https base URL
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DispatchConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::DispatchConfig;
use crate::pool::Host;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no hosts configured")]
    NoHosts,

    #[error("invalid host '{host}': {reason}")]
    InvalidHost { host: String, reason: String },

    #[error("host '{0}' is listed more than once")]
    DuplicateHost(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
}

pub fn validate_config(config: &DispatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.hosts.is_empty() {
        errors.push(ValidationError::NoHosts);
    }

    let mut seen = HashSet::new();
    for raw in &config.hosts {
        match Host::parse(raw) {
            Ok(host) => {
                if !seen.insert(host.url().clone()) {
                    errors.push(ValidationError::DuplicateHost(raw.clone()));
                }
            }
            Err(e) => errors.push(ValidationError::InvalidHost {
                host: raw.clone(),
                reason: e.to_string(),
            }),
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.connect_secs"));
    }

    match config.observability.log_level.to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        other => errors.push(ValidationError::UnknownLogLevel(other.to_string())),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
