//! Sentinel token matching.
//!
//! # Token grammar
//! ```text
//! ERR-<code>            immediate fault with catalog code <code>
//! DLR-DELAYED-<secs>    wait <secs> before the first delivery report
//! DLR-<EVENT>-<code>    report <EVENT> with DLR error <code> instead of DELIVERED
//! ```
//! Tokens are whitespace separated and checked independently, so one text
//! can carry several. Panic and slow-response sentinels are exact matches on
//! a configured field.

use std::time::Duration;

use crate::config::{Sentinel, SentinelField, SimulationConfig};
use crate::gateway::faults::{self, Fault};

const ERR_PREFIX: &str = "ERR-";
const DLR_PREFIX: &str = "DLR-";
const DELAY_KEYWORD: &str = "DELAYED";

/// Event and error code to report instead of DELIVERED.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DlrOverride {
    pub event: String,
    pub error_code: u32,
    pub error_message: String,
}

/// Simulated outcome derived from one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternMatch {
    pub immediate_error: Option<Fault>,
    pub abort: bool,
    pub slow_response: bool,
    pub dlr_error: Option<DlrOverride>,
    pub dlr_delay: Option<Duration>,
}

impl PatternMatch {
    /// Nothing matched: success, DELIVERED, default delay.
    pub fn is_default(&self) -> bool {
        *self == PatternMatch::default()
    }
}

/// Inspects request content for sentinel tokens.
#[derive(Debug, Clone)]
pub struct FaultPatternMatcher {
    panic: Sentinel,
    slow_response: Sentinel,
}

impl FaultPatternMatcher {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            panic: config.panic.clone(),
            slow_response: config.slow_response.clone(),
        }
    }

    /// Derive the simulated outcome for a receiver/text pair.
    pub fn inspect(&self, receiver: &str, text: &str) -> PatternMatch {
        let mut matched = PatternMatch {
            abort: sentinel_hit(&self.panic, receiver, text),
            slow_response: sentinel_hit(&self.slow_response, receiver, text),
            ..Default::default()
        };

        for token in text.split_whitespace() {
            if let Some(code) = token.strip_prefix(ERR_PREFIX) {
                if matched.immediate_error.is_none() {
                    matched.immediate_error = parse_digits::<u16>(code).map(Fault::from_code);
                }
            } else if let Some(rest) = token.strip_prefix(DLR_PREFIX) {
                if let Some(secs) = rest.strip_prefix(DELAY_KEYWORD).and_then(|s| s.strip_prefix('-')) {
                    if let Some(secs) = parse_digits::<u64>(secs) {
                        matched.dlr_delay = Some(Duration::from_secs(secs));
                    }
                } else if let Some(dlr) = parse_dlr_override(rest) {
                    matched.dlr_error = Some(dlr);
                }
            }
        }

        matched
    }
}

fn sentinel_hit(sentinel: &Sentinel, receiver: &str, text: &str) -> bool {
    match sentinel.field {
        SentinelField::Receiver => receiver == sentinel.value,
        SentinelField::Text => text == sentinel.value,
    }
}

fn parse_digits<T: std::str::FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// `<EVENT>-<code>` with an upper-case event name.
fn parse_dlr_override(rest: &str) -> Option<DlrOverride> {
    let (event, code) = rest.rsplit_once('-')?;
    let valid_event = !event.is_empty()
        && event.bytes().all(|b| b.is_ascii_uppercase() || b == b'_');
    if !valid_event {
        return None;
    }
    let error_code = parse_digits::<u32>(code)?;
    Some(DlrOverride {
        event: event.to_string(),
        error_code,
        error_message: faults::dlr_message(error_code).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dlr::report::{BUFFERED, REJECTED, SENT_TO_SMSC};

    fn matcher() -> FaultPatternMatcher {
        FaultPatternMatcher::new(&SimulationConfig::default())
    }

    #[test]
    fn test_plain_text_is_default_path() {
        assert!(matcher().inspect("41790000000", "Hello there").is_default());
    }

    #[test]
    fn test_immediate_error_token() {
        let matched = matcher().inspect("41790000000", "ERR-106");
        assert_eq!(matched.immediate_error, Some(Fault::from_code(106)));

        let matched = matcher().inspect("41790000000", "please fail ERR-103 now ERR-104");
        assert_eq!(matched.immediate_error.unwrap().code, "103");
    }

    #[test]
    fn test_malformed_error_tokens_are_ignored() {
        let m = matcher();
        assert!(m.inspect("1", "ERR-").is_default());
        assert!(m.inspect("1", "ERR-abc").is_default());
        assert!(m.inspect("1", "XERR-106").is_default());
        assert!(m.inspect("1", "ERR-99999999").is_default());
    }

    #[test]
    fn test_dlr_error_token() {
        let matched = matcher().inspect("1", "DLR-UNDELIVERED-995");
        assert_eq!(
            matched.dlr_error,
            Some(DlrOverride {
                event: "UNDELIVERED".into(),
                error_code: 995,
                error_message: "Message rejected by operator.".into(),
            })
        );
        assert!(matched.immediate_error.is_none());
        assert!(matched.dlr_delay.is_none());

        let matched = matcher().inspect("1", "DLR-SENT_TO_SMSC-0");
        let dlr = matched.dlr_error.unwrap();
        assert_eq!(dlr.event, SENT_TO_SMSC);
        assert_eq!(dlr.error_message, "");

        let matched = matcher().inspect("1", "DLR-BUFFERED-902");
        let dlr = matched.dlr_error.unwrap();
        assert_eq!(dlr.event, BUFFERED);
        assert_eq!(dlr.error_message, "Handset busy.");
    }

    #[test]
    fn test_dlr_delay_token() {
        let matched = matcher().inspect("1", "DLR-DELAYED-5");
        assert_eq!(matched.dlr_delay, Some(Duration::from_secs(5)));
        assert!(matched.dlr_error.is_none());
    }

    #[test]
    fn test_tokens_combine() {
        let matched = matcher().inspect("1", "DLR-REJECTED-992 DLR-DELAYED-1 hi");
        assert_eq!(matched.dlr_error.unwrap().event, REJECTED);
        assert_eq!(matched.dlr_delay, Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_lowercase_event_is_not_a_token() {
        assert!(matcher().inspect("1", "DLR-undelivered-995").dlr_error.is_none());
    }

    #[test]
    fn test_receiver_sentinels() {
        let m = matcher();
        assert!(m.inspect("41764986185", "hi").abort);
        assert!(m.inspect("41764986186", "hi").slow_response);
        assert!(!m.inspect("41764986187", "41764986185").abort);
    }

    #[test]
    fn test_text_sentinels() {
        let config = SimulationConfig {
            panic: Sentinel::text("panic"),
            slow_response: Sentinel::text("timeout"),
            ..Default::default()
        };
        let m = FaultPatternMatcher::new(&config);
        assert!(m.inspect("41764986185", "panic").abort);
        assert!(!m.inspect("41764986185", "hi").abort);
        assert!(m.inspect("1", "timeout").slow_response);
        assert!(!m.inspect("1", "timeout please").slow_response);
    }
}
