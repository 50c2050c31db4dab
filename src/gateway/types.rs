//! Send-SMS request and response types.

use serde::{Deserialize, Serialize};

use crate::gateway::faults::Fault;

/// Account credentials. Only the username is used, as the DLR account name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// One send-SMS submission as decoded from the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SendRequest {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(rename = "Auth")]
    pub auth: Credentials,
    pub sender: String,
    pub receiver: String,
    /// Data coding scheme hint; the encoding is always derived from the text.
    pub dcs: String,
    pub text: String,
    pub dlr_mask: i64,
    #[serde(rename = "dlrUrl")]
    pub dlr_url: String,
}

impl SendRequest {
    /// Sender, receiver and text are mandatory.
    pub fn missing_mandatory(&self) -> bool {
        self.sender.is_empty() || self.receiver.is_empty() || self.text.is_empty()
    }

    /// The callback URL, if the client asked for delivery reports.
    pub fn callback_url(&self) -> Option<&str> {
        Some(self.dlr_url.as_str()).filter(|url| !url.is_empty())
    }
}

/// Flat URL-encoded body accepted by the legacy form variant.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacyForm {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(rename = "Auth.username")]
    pub username: String,
    #[serde(rename = "Auth.password")]
    pub password: String,
    pub sender: String,
    pub receiver: String,
    pub dcs: String,
    pub text: String,
    #[serde(rename = "dlrMask")]
    pub dlr_mask: i64,
    #[serde(rename = "dlrUrl")]
    pub dlr_url: String,
}

impl From<LegacyForm> for SendRequest {
    fn from(form: LegacyForm) -> Self {
        Self {
            message_type: form.message_type,
            auth: Credentials {
                username: form.username,
                password: form.password,
            },
            sender: form.sender,
            receiver: form.receiver,
            dcs: form.dcs,
            text: form.text,
            dlr_mask: form.dlr_mask,
            dlr_url: form.dlr_url,
        }
    }
}

/// Body of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accepted {
    pub msg_id: String,
    pub num_parts: usize,
}

/// Wire envelope of a rejected submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultEnvelope {
    pub error: Fault,
}

/// Exactly one of these is the whole response body of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SendResult {
    Success(Accepted),
    Fault(FaultEnvelope),
}

impl SendResult {
    pub fn fault(fault: Fault) -> Self {
        SendResult::Fault(FaultEnvelope { error: fault })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SendResult::Success(_))
    }
}
