//! Live traffic envelope.

use serde::{Deserialize, Serialize};

pub const BULK_MSG: &str = "bulk_msg";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageData {
    pub sender: String,
    pub receiver: String,
    pub text: String,
}

/// Envelope mirrored to every live subscriber once per accepted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub data: MessageData,
}

impl BroadcastMessage {
    pub fn bulk(sender: &str, receiver: &str, text: &str) -> Self {
        Self {
            msg_type: BULK_MSG.to_string(),
            data: MessageData {
                sender: sender.to_string(),
                receiver: receiver.to_string(),
                text: text.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_schema() {
        let msg = BroadcastMessage::bulk("ACME", "4179", "hi");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            serde_json::json!({
                "type": "bulk_msg",
                "data": { "sender": "ACME", "receiver": "4179", "text": "hi" }
            })
        );
    }
}
