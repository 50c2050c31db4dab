//! Published fault catalog.
//!
//! Codes and messages are reproduced verbatim, typos included, because
//! client integrations compare them byte for byte.

use serde::{Deserialize, Serialize};

pub const AUTH_FAILED: u16 = 101;
pub const ACCOUNT_BLOCKED: u16 = 102;
pub const INSUFFICIENT_CREDIT: u16 = 103;
pub const INVALID_SENDER: u16 = 104;
pub const THROTTLED: u16 = 105;
pub const INVALID_RECEIVER: u16 = 106;
pub const UNSUPPORTED_TYPE: u16 = 107;
pub const TOO_LONG: u16 = 108;
pub const BAD_FORMAT: u16 = 109;
pub const MISSING_PARAMETER: u16 = 110;
pub const INVALID_DCS: u16 = 111;
pub const INTERNAL_ERROR: u16 = 112;

const API_ERRORS: &[(u16, &str)] = &[
    (AUTH_FAILED, "Authentication failed."),
    (ACCOUNT_BLOCKED, "Account is blocked or suspended."),
    (INSUFFICIENT_CREDIT, "Insufficient credit."),
    (INVALID_SENDER, "Invalid sender address."),
    (
        THROTTLED,
        "Too many messages submitted withing short period of time. Resend later.",
    ),
    (INVALID_RECEIVER, "Invalid receiver address."),
    (UNSUPPORTED_TYPE, "Message type is not supported."),
    (TOO_LONG, "Message text is too long."),
    (BAD_FORMAT, "Format of text/content parameter iswrong."),
    (MISSING_PARAMETER, "Mandatory parameter is missing"),
    (INVALID_DCS, "Invalid data coding scheme."),
    (INTERNAL_ERROR, "Internal gateway error."),
];

const UNKNOWN_API_ERROR: &str = "Unknown error.";

const DLR_ERRORS: &[(u32, &str)] = &[
    (0, ""),
    (901, "Absent subscriber."),
    (902, "Handset busy."),
    (903, "Unknown subscriber."),
    (904, "Call barred by operator."),
    (905, "Handset memory capacity exceeded."),
    (906, "Illegal subscriber."),
    (907, "Roaming not allowed."),
    (990, "Message validity period expired."),
    (991, "Message deleted by SMSC."),
    (992, "Message rejected by SMSC."),
    (993, "Destination network unreachable."),
    (994, "Message blocked by spam filter."),
    (995, "Message rejected by operator."),
    (999, "Unknown delivery error."),
];

const UNKNOWN_DLR_ERROR: &str = "Unknown delivery error.";

/// Catalog message for an API fault code, if the code is published.
pub fn api_message(code: u16) -> Option<&'static str> {
    API_ERRORS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, message)| *message)
}

/// Catalog description for a delivery report error code.
pub fn dlr_message(code: u32) -> &'static str {
    DLR_ERRORS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, message)| *message)
        .unwrap_or(UNKNOWN_DLR_ERROR)
}

/// A machine-readable code plus human-readable message returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    pub code: String,
    pub message: String,
}

impl Fault {
    /// Build a fault from the catalog; unknown codes get a generic message.
    pub fn from_code(code: u16) -> Self {
        Self {
            code: code.to_string(),
            message: api_message(code).unwrap_or(UNKNOWN_API_ERROR).to_string(),
        }
    }

    pub fn throttled() -> Self {
        Self::from_code(THROTTLED)
    }

    pub fn too_long() -> Self {
        Self::from_code(TOO_LONG)
    }

    pub fn bad_format() -> Self {
        Self::from_code(BAD_FORMAT)
    }

    pub fn missing_parameter() -> Self {
        Self::from_code(MISSING_PARAMETER)
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}
