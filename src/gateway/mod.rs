//! Send-SMS request handling.
//!
//! # Data Flow
//! ```text
//! SendRequest (decoded by http::bulk)
//!     → patterns.rs (sentinel tokens → simulated outcome)
//!     → throttle.rs (process-wide request counter)
//!     → processor.rs (validation, broadcast, segmentation, DLR scheduling)
//!     → Outcome (response body, or abort)
//! ```
//!
//! # Design Decisions
//! - All faults come from the fixed catalog in faults.rs
//! - The processor never writes HTTP; the abort is raised by the host handler

pub mod faults;
pub mod patterns;
pub mod processor;
pub mod throttle;
pub mod types;

pub use faults::Fault;
pub use patterns::{DlrOverride, FaultPatternMatcher, PatternMatch};
pub use processor::{Outcome, RequestProcessor};
pub use throttle::RequestCounter;
pub use types::{Accepted, Credentials, FaultEnvelope, LegacyForm, SendRequest, SendResult};
