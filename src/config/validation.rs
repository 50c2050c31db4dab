//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, addresses parse)
//! - Keep the request timeout longer than the slow-response stall
//! - Reject sentinels that could never match
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Check a parsed configuration for values the gateway cannot run with.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.listener.bind_address.parse::<SocketAddr>() {
        errors.push(ValidationError::new("listener.bind_address", e.to_string()));
    }

    if config.observability.metrics_enabled {
        if let Err(e) = config.observability.metrics_address.parse::<SocketAddr>() {
            errors.push(ValidationError::new("observability.metrics_address", e.to_string()));
        }
    }

    if config.timeouts.request_secs <= config.simulation.slow_response_secs {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            format!(
                "must exceed simulation.slow_response_secs ({})",
                config.simulation.slow_response_secs
            ),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if config.throttle.max_requests == 0 {
        errors.push(ValidationError::new("throttle.max_requests", "must be greater than 0"));
    }

    if config.segments.max_segments == 0 {
        errors.push(ValidationError::new("segments.max_segments", "must be greater than 0"));
    }

    if config.simulation.panic.value.is_empty() {
        errors.push(ValidationError::new("simulation.panic.value", "must not be empty"));
    }

    if config.simulation.slow_response.value.is_empty() {
        errors.push(ValidationError::new("simulation.slow_response.value", "must not be empty"));
    }

    if config.dlr.request_timeout_secs == 0 {
        errors.push(ValidationError::new("dlr.request_timeout_secs", "must be greater than 0"));
    }

    if config.hub.subscriber_buffer == 0 {
        errors.push(ValidationError::new("hub.subscriber_buffer", "must be greater than 0"));
    }

    if config.hub.ping_interval_secs == 0 {
        errors.push(ValidationError::new("hub.ping_interval_secs", "must be greater than 0"));
    }

    if config.admin.enabled && config.admin.api_key.is_empty() {
        errors.push(ValidationError::new("admin.api_key", "required when admin is enabled"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
