//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the mock gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the mock bulk gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub security: SecurityConfig,

    /// Synthetic throttle settings.
    pub throttle: ThrottleConfig,

    /// SMS segmentation limits.
    pub segments: SegmentConfig,

    /// Fault simulation sentinels.
    pub simulation: SimulationConfig,

    /// Delivery report dispatch settings.
    pub dlr: DlrConfig,

    /// Live traffic broadcaster settings.
    pub hub: HubConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub static_files: StaticFilesConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds. Must outlive the slow-response sentinel.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Crude request-count throttle.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Requests accepted before the next one is answered with fault 105.
    pub max_requests: usize,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self { max_requests: 500 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Messages needing more segments than this are rejected as too long.
    pub max_segments: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self { max_segments: 6 }
    }
}

/// Which request field an exact-value sentinel is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SentinelField {
    Receiver,
    Text,
}

/// An exact-value trigger on one request field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Sentinel {
    pub field: SentinelField,
    pub value: String,
}

impl Sentinel {
    pub fn receiver(value: &str) -> Self {
        Self {
            field: SentinelField::Receiver,
            value: value.to_string(),
        }
    }

    pub fn text(value: &str) -> Self {
        Self {
            field: SentinelField::Text,
            value: value.to_string(),
        }
    }
}

/// When the abort sentinel unwinds the request task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortStage {
    /// Abort before any response body is written.
    #[default]
    BeforeResponse,
    /// Start writing the success body, then abort the connection.
    AfterResponse,
}

/// Fault simulation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Sentinel that aborts the request task.
    pub panic: Sentinel,

    /// Sentinel that stalls the response.
    pub slow_response: Sentinel,

    /// How long the slow-response sentinel stalls, in seconds.
    pub slow_response_secs: u64,

    pub abort_stage: AbortStage,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            panic: Sentinel::receiver("41764986185"),
            slow_response: Sentinel::receiver("41764986186"),
            slow_response_secs: 45,
            abort_stage: AbortStage::BeforeResponse,
        }
    }
}

/// Delivery report dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DlrConfig {
    /// Delay before the first callback when no delay token is present.
    pub default_delay_secs: u64,

    /// Per-callback timeout in seconds.
    pub request_timeout_secs: u64,

    /// Skip TLS certificate verification for callback URLs.
    pub accept_invalid_certs: bool,

    /// Route callbacks through proxies from the environment.
    pub use_system_proxy: bool,
}

impl Default for DlrConfig {
    fn default() -> Self {
        Self {
            default_delay_secs: 2,
            request_timeout_secs: 10,
            accept_invalid_certs: true,
            use_system_proxy: false,
        }
    }
}

/// Broadcaster configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HubConfig {
    /// Outbound buffer per subscriber; a full buffer gets the subscriber dropped.
    pub subscriber_buffer: usize,

    /// WebSocket ping interval in seconds.
    pub ping_interval_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            subscriber_buffer: 256,
            ping_interval_secs: 54,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Expose `/admin/status`. Off unless configured.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: "bulk-admin-key".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory served for every path no other route claims.
    pub dir: Option<String>,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            dir: Some("./public".to_string()),
        }
    }
}
