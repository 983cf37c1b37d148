//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the workflow service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// API listener settings.
    pub server: ServerConfig,

    /// Swap-quote backend settings.
    pub swap: SwapConfig,

    /// Wallet bridge settings.
    pub chain: ChainConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// API listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request timeout in seconds. Does not apply to WebSocket sessions
    /// once upgraded.
    pub request_timeout_secs: u64,

    /// Capacity of the status/notice broadcast channels.
    pub event_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            event_buffer: 256,
        }
    }
}

/// Swap-quote backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SwapConfig {
    /// Base URL of the quote backend. `None` disables quoting.
    pub base_url: Option<String>,

    /// Quote request timeout in milliseconds.
    pub timeout_ms: u64,

    /// Slippage tolerance applied when the quote carries none.
    pub default_slippage_bps: u32,

    /// Debounce window for quote requests arriving over the WebSocket.
    pub debounce_ms: u64,

    /// Lifetime of the notice shown when a quote fails.
    pub notice_ttl_ms: u64,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: 5_000,
            default_slippage_bps: 50,
            debounce_ms: 400,
            notice_ttl_ms: 5_000,
        }
    }
}

/// Wallet bridge configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ChainConfig {
    /// Primary bridge URL. Writes always go here.
    pub bridge_url: String,

    /// Failover bridge URLs, used for reads only.
    pub failover_urls: Vec<String>,

    /// Per-call timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Overall deadline for a transaction to be sealed.
    pub finality_timeout_secs: u64,

    /// Interval between transaction result polls in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            bridge_url: "http://localhost:8701".to_string(),
            failover_urls: Vec::new(),
            rpc_timeout_secs: 10,
            finality_timeout_secs: 120,
            poll_interval_ms: 1_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "chronobond=info,tower_http=info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
