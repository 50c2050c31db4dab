//! Delivery report payload.

use serde::{Deserialize, Serialize};

use crate::gateway::patterns::DlrOverride;

pub const DELIVERED: &str = "DELIVERED";
pub const UNDELIVERED: &str = "UNDELIVERED";
pub const BUFFERED: &str = "BUFFERED";
pub const SENT_TO_SMSC: &str = "SENT_TO_SMSC";
pub const REJECTED: &str = "REJECTED";

/// Fate of one message part, POSTed to the client's callback URL.
///
/// Part numbers are 0-based: `part_num` ranges over `[0, num_parts)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    pub msg_id: String,
    pub event: String,
    pub error_code: u32,
    pub error_message: String,
    pub part_num: usize,
    pub num_parts: usize,
    pub account_name: String,
}

impl DeliveryReport {
    /// A successful delivery of part 0.
    pub fn delivered(msg_id: &str, num_parts: usize, account_name: &str) -> Self {
        Self {
            msg_id: msg_id.to_string(),
            event: DELIVERED.to_string(),
            error_code: 0,
            error_message: String::new(),
            part_num: 0,
            num_parts,
            account_name: account_name.to_string(),
        }
    }

    /// Replace the event and error with a simulated outcome.
    pub fn with_override(mut self, dlr: &DlrOverride) -> Self {
        self.event = dlr.event.clone();
        self.error_code = dlr.error_code;
        self.error_message = dlr.error_message.clone();
        self
    }

    /// The report for one part; everything but the part number is shared.
    pub fn for_part(&self, part_num: usize) -> Self {
        Self {
            part_num,
            ..self.clone()
        }
    }
}
