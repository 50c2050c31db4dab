//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → bulk.rs      POST /bulk_server  (send SMS)
//!     → dlr_test.rs  /dlr_test          (log callbacks)
//!     → websocket.rs GET  /ws           (live traffic)
//!     → static files for everything else
//! ```

pub mod bulk;
pub mod dlr_test;
pub mod server;
pub mod websocket;

pub use server::{AppState, HttpServer};
