//! Dispatch error taxonomy.
//!
//! # Propagation
//! ```text
//! Transport        → absorbed + logged while hosts remain, terminal on the last host
//! everything else  → escalates immediately, no further hosts are tried
//! ```
//!
//! # Design Decisions
//! - Pool exhaustion is the final host's `Transport` error (`attempt == of`);
//!   the host iteration cannot fall through without a value or an error
//! - Non-2xx replies are `UnsuccessfulStatus`, never a failover trigger
//! - Request shaping errors surface before any network activity

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

/// Why a single attempt against one host produced no reply.
#[derive(Debug, Error)]
pub enum TransportFailure {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// No response headers arrived within the per-host timeout.
    #[error("no response within {0:?}")]
    TimedOut(Duration),
}

impl TransportFailure {
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportFailure::Http(e) => e.is_timeout(),
            TransportFailure::TimedOut(_) => true,
        }
    }

    /// Connectivity failures move on to the next host; anything else
    /// (redirect loops, malformed requests) would fail the same way there.
    pub fn allows_failover(&self) -> bool {
        match self {
            TransportFailure::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            TransportFailure::TimedOut(_) => true,
        }
    }
}

/// Errors produced by the dispatcher and its request shaping helpers.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The host pool or transport settings are unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A host could not be reached or did not answer within the timeout.
    #[error("request to {host} failed (attempt {attempt} of {of}): {source}")]
    Transport {
        host: Url,
        attempt: usize,
        of: usize,
        #[source]
        source: TransportFailure,
    },

    /// A host answered with a status outside the 2xx range.
    #[error(
        "{endpoint} on {host} returned unsuccessful status {status}{}",
        excerpt_suffix(.excerpt)
    )]
    UnsuccessfulStatus {
        host: Url,
        endpoint: String,
        status: StatusCode,
        /// Leading bytes of the reply body, lossily decoded.
        excerpt: Option<String>,
    },

    /// A host answered 2xx but the body was empty or whitespace.
    #[error("WebService's response was empty\nEndpoint: {endpoint}\nRequest data: {arguments}")]
    EmptyResponse { endpoint: String, arguments: String },

    /// The response body was not valid JSON for the requested type.
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// Reading the body of a reply failed after the host answered.
    #[error("failed to read response body of {endpoint} from {host}: {source}")]
    Body {
        host: Url,
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request payload could not be serialized.
    #[error("failed to encode request payload: {0}")]
    Encode(#[source] serde_json::Error),

    /// The call descriptor cannot be turned into a valid HTTP request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The caller cancelled the call while it was in flight.
    #[error("call to {endpoint} was cancelled")]
    Cancelled { endpoint: String },

    /// Writing the response body into the caller's sink failed.
    #[error("failed to write response body: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatchError {
    /// True when this is the transport failure of the last host in the pool.
    pub fn hosts_exhausted(&self) -> bool {
        matches!(self, DispatchError::Transport { attempt, of, .. } if attempt == of)
    }

    /// True for connectivity-level failures (connect, DNS, timeout).
    pub fn is_transport(&self) -> bool {
        matches!(self, DispatchError::Transport { .. })
    }

    /// True when the last transport failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            DispatchError::Transport { source, .. } => source.is_timeout(),
            DispatchError::Body { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Configuration(_) => "configuration",
            DispatchError::Transport { .. } => "transport",
            DispatchError::UnsuccessfulStatus { .. } => "status",
            DispatchError::EmptyResponse { .. } => "empty",
            DispatchError::Decode { .. } => "decode",
            DispatchError::Body { .. } => "body",
            DispatchError::Encode(_) => "encode",
            DispatchError::InvalidRequest(_) => "invalid_request",
            DispatchError::Cancelled { .. } => "cancelled",
            DispatchError::Io(_) => "io",
        }
    }

    /// Upstream status for `UnsuccessfulStatus`, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            DispatchError::UnsuccessfulStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn excerpt_suffix(excerpt: &Option<String>) -> String {
    match excerpt {
        Some(text) => format!("\nResponse excerpt: {text}"),
        None => String::new(),
    }
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
