//! HTTP transports.
//!
//! # Responsibilities
//! - Build the shared, pooled client used by GET operations
//! - Build the dedicated per-call client used by POST operations
//! - Bound connects and stalled body reads
//!
//! # Design Decisions
//! - The per-host timeout bounds one attempt up to the response headers and
//!   is enforced by the dispatcher; the clients carry no whole-exchange
//!   timeout, so a live body can be read for as long as data keeps arriving
//! - A body read that stalls for longer than the per-host timeout fails
//! - Certificate validation is only relaxed when configuration asks for it,
//!   and only on the dedicated POST transports

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

use crate::config::DispatchConfig;
use crate::error::{DispatchError, DispatchResult};

/// Settings shared by every transport a dispatcher builds.
#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Per-host time bound for one attempt (connect up to response headers),
    /// also the longest pause allowed between body reads.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Skip certificate validation on dedicated POST transports.
    pub accept_invalid_certs: bool,
    pub use_system_proxy: bool,
    pub user_agent: String,
    pub record_metrics: bool,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self::from_config(&DispatchConfig::default())
    }
}

impl TransportSettings {
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
            connect_timeout: Duration::from_secs(config.timeouts.connect_secs),
            accept_invalid_certs: config.tls.accept_invalid_certs,
            use_system_proxy: config.transport.use_system_proxy,
            user_agent: config.transport.user_agent.clone(),
            record_metrics: config.observability.metrics_enabled,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_system_proxy(mut self, enabled: bool) -> Self {
        self.use_system_proxy = enabled;
        self
    }

    pub fn with_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    fn builder(&self) -> ClientBuilder {
        let builder = Client::builder()
            .read_timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout.min(self.request_timeout))
            .user_agent(self.user_agent.clone());
        if self.use_system_proxy {
            builder
        } else {
            builder.no_proxy()
        }
    }
}

/// Pooled client shared by all calls of one dispatcher.
pub(crate) fn shared_client(settings: &TransportSettings) -> DispatchResult<Client> {
    settings
        .builder()
        .build()
        .map_err(|e| DispatchError::Configuration(format!("failed to build HTTP client: {}", e)))
}

/// Client owned by a single POST call.
pub(crate) fn dedicated_client(settings: &TransportSettings) -> DispatchResult<Client> {
    let mut builder = settings.builder().pool_max_idle_per_host(0);
    if settings.accept_invalid_certs {
        tracing::warn!("Certificate validation is disabled for this POST transport");
        builder = builder.danger_accept_invalid_certs(true);
    }
    builder
        .build()
        .map_err(|e| DispatchError::Configuration(format!("failed to build HTTP client: {}", e)))
}
