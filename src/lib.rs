//! Mock SMS bulk gateway library.
//!
//! A test double for an SMS aggregator HTTP API: it validates send requests,
//! counts segments, simulates faults on sentinel tokens, posts delivery
//! reports back to the caller and mirrors traffic to live observers.

// Core subsystems
pub mod config;
pub mod gateway;
pub mod http;
pub mod sms;

// Asynchronous side channels
pub mod dlr;
pub mod hub;

// Cross-cutting concerns
pub mod admin;
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
