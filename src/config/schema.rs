//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a dispatcher
//! and the application that owns it. All types derive Serde traits for
//! deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    /// Interchangeable base URLs of the upstream service.
    pub hosts: Vec<String>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Certificate validation settings for POST transports.
    pub tls: TlsConfig,

    /// Shared transport settings.
    pub transport: TransportConfig,

    /// Settings read by the owning application.
    pub app: AppSettings,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-host request timeout (connect + response) in seconds.
    pub request_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            connect_secs: 5,
        }
    }
}

/// TLS configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TlsConfig {
    /// Skip certificate validation on the dedicated POST transports.
    ///
    /// WARNING: only for environments with self-signed certificates.
    pub accept_invalid_certs: bool,
}

/// Shared transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Honor `HTTP_PROXY` / `HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            use_system_proxy: true,
            user_agent: concat!("multihost-dispatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Application settings carried alongside the dispatcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppSettings {
    /// Run pending database migrations at startup.
    pub enable_auto_migrate_db: bool,

    /// Session time-to-live in minutes.
    pub session_ttl_minutes: u64,

    /// Require HTTPS for the application's own listener.
    pub use_https: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            enable_auto_migrate_db: false,
            session_ttl_minutes: 20,
            use_https: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Record dispatch metrics through the `metrics` facade.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: true,
        }
    }
}
