//! Delivery report subsystem.
//!
//! # Data Flow
//! ```text
//! RequestProcessor (after the response is decided)
//!     → DlrJob (owned copy: URL, template report, delay)
//!     → DlrDispatcher::schedule (detached task)
//!     → sleep(delay)
//!     → POST one DeliveryReport per part, part 0 first
//! ```
//!
//! # Design Decisions
//! - Best effort: a failed part is logged and the next part is still sent
//! - No retries, at most once per part
//! - The task owns everything it needs and outlives the HTTP request

pub mod dispatcher;
pub mod report;

pub use dispatcher::{DispatchError, DispatchSummary, DlrDispatcher, DlrJob};
pub use report::DeliveryReport;
