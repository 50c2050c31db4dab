//! Send-SMS request orchestration.
//!
//! # State Machine
//! ```text
//! Received → Validated ─┬─ Rejected(Fault)
//!                       └─ Accepted ─┬─ RespondedSuccess      (+ optional DLR)
//!                                    └─ RespondedThenAborted  (+ optional DLR)
//! ```
//! Order of checks: immediate-error token, throttle, mandatory fields,
//! broadcast, segmentation. A DLR job is scheduled for every accepted
//! request with a callback URL, including ones that go on to abort.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::dlr::{DeliveryReport, DlrDispatcher, DlrJob};
use crate::gateway::faults::Fault;
use crate::gateway::patterns::{FaultPatternMatcher, PatternMatch};
use crate::gateway::throttle::RequestCounter;
use crate::gateway::types::{Accepted, SendRequest, SendResult};
use crate::hub::{BroadcastMessage, HubHandle};
use crate::observability::metrics;
use crate::sms::count_segments;

/// Terminal state of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Write this body and finish normally.
    Respond(SendResult),
    /// The abort sentinel fired: the request task must unwind.
    /// `accepted` is what a normal response would have carried.
    Abort { accepted: Accepted, reason: String },
}

impl Outcome {
    fn reject(fault: Fault) -> Self {
        Outcome::Respond(SendResult::fault(fault))
    }
}

/// Validates, throttles and answers send-SMS requests.
#[derive(Clone)]
pub struct RequestProcessor {
    counter: Arc<RequestCounter>,
    matcher: FaultPatternMatcher,
    hub: HubHandle,
    dispatcher: DlrDispatcher,
    max_segments: usize,
    default_dlr_delay: Duration,
    slow_response_delay: Duration,
}

impl RequestProcessor {
    pub fn new(
        config: &GatewayConfig,
        counter: Arc<RequestCounter>,
        hub: HubHandle,
        dispatcher: DlrDispatcher,
    ) -> Self {
        Self {
            counter,
            matcher: FaultPatternMatcher::new(&config.simulation),
            hub,
            dispatcher,
            max_segments: config.segments.max_segments,
            default_dlr_delay: Duration::from_secs(config.dlr.default_delay_secs),
            slow_response_delay: Duration::from_secs(config.simulation.slow_response_secs),
        }
    }

    pub fn counter(&self) -> &RequestCounter {
        &self.counter
    }

    pub async fn handle(&self, request: SendRequest) -> Outcome {
        let matched = self.matcher.inspect(&request.receiver, &request.text);

        // 1. Simulated upstream fault: no counting, no broadcast, no DLR
        if let Some(fault) = matched.immediate_error.clone() {
            tracing::info!(code = %fault.code, "Simulated error requested");
            metrics::record_request("simulated_error");
            return Outcome::reject(fault);
        }

        // 2. Synthetic throttle
        if !self.counter.admit() {
            tracing::warn!(limit = self.counter.limit(), "Request counter tripped, throttling");
            metrics::record_request("throttled");
            return Outcome::reject(Fault::throttled());
        }

        // 3. Mandatory parameters
        if request.missing_mandatory() {
            tracing::info!("Bulk request invalid params");
            metrics::record_request("missing_parameter");
            return Outcome::reject(Fault::missing_parameter());
        }

        // 4. Mirror to live observers
        self.hub
            .publish(&BroadcastMessage::bulk(&request.sender, &request.receiver, &request.text));

        // 5. Segmentation
        let msg_id = Uuid::new_v4().to_string();
        let num_parts = count_segments(&request.text, self.max_segments);
        if num_parts == 0 {
            metrics::record_request("too_long");
            return Outcome::reject(Fault::too_long());
        }

        if matched.slow_response {
            tracing::info!(delay = ?self.slow_response_delay, "Simulating slow response");
            tokio::time::sleep(self.slow_response_delay).await;
        }

        let accepted = Accepted { msg_id, num_parts };

        // 6. Delivery reports, independent of how the response ends
        if let Some(job) = self.plan_delivery(&request, &matched, &accepted) {
            self.dispatcher.schedule(job);
        }

        if matched.abort {
            metrics::record_request("aborted");
            return Outcome::Abort {
                accepted,
                reason: format!("Panic on receiver [{}]", request.receiver),
            };
        }

        tracing::info!(msg_id = %accepted.msg_id, parts = accepted.num_parts, "Valid request and replied: OK");
        metrics::record_request("accepted");
        Outcome::Respond(SendResult::Success(accepted))
    }

    /// Build the DLR job for an accepted request, if it asked for reports.
    pub fn plan_delivery(
        &self,
        request: &SendRequest,
        matched: &PatternMatch,
        accepted: &Accepted,
    ) -> Option<DlrJob> {
        let url = request.callback_url()?;

        let mut template =
            DeliveryReport::delivered(&accepted.msg_id, accepted.num_parts, &request.auth.username);
        if let Some(dlr) = &matched.dlr_error {
            template = template.with_override(dlr);
        }

        Some(DlrJob {
            url: url.to_string(),
            template,
            delay: matched.dlr_delay.unwrap_or(self.default_dlr_delay),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Sentinel;
    use crate::gateway::faults;
    use crate::hub::Hub;
    use crate::lifecycle::Shutdown;

    struct Fixture {
        processor: RequestProcessor,
        hub: HubHandle,
        _shutdown: Shutdown,
    }

    fn fixture(config: GatewayConfig) -> Fixture {
        let shutdown = Shutdown::new();
        let hub = Hub::spawn(config.hub.subscriber_buffer, shutdown.subscribe());
        let counter = Arc::new(RequestCounter::new(config.throttle.max_requests));
        let dispatcher = DlrDispatcher::new(&config.dlr).unwrap();
        Fixture {
            processor: RequestProcessor::new(&config, counter, hub.clone(), dispatcher),
            hub,
            _shutdown: shutdown,
        }
    }

    fn request(text: &str) -> SendRequest {
        SendRequest {
            sender: "ACME".into(),
            receiver: "41790000000".into(),
            text: text.into(),
            auth: crate::gateway::types::Credentials {
                username: "acme".into(),
                password: "secret".into(),
            },
            ..Default::default()
        }
    }

    fn fault_code(outcome: &Outcome) -> Option<&str> {
        match outcome {
            Outcome::Respond(SendResult::Fault(envelope)) => Some(envelope.error.code.as_str()),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_plain_request_succeeds_and_broadcasts() {
        let f = fixture(GatewayConfig::default());
        let mut sub = f.hub.subscribe();

        let outcome = f.processor.handle(request("Hello")).await;
        match outcome {
            Outcome::Respond(SendResult::Success(accepted)) => {
                assert_eq!(accepted.num_parts, 1);
                assert!(Uuid::parse_str(&accepted.msg_id).is_ok());
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        let payload = sub.receiver.recv().await.unwrap();
        let msg: BroadcastMessage = serde_json::from_str(&payload).unwrap();
        assert_eq!(msg, BroadcastMessage::bulk("ACME", "41790000000", "Hello"));
    }

    #[tokio::test]
    async fn test_simulated_error_skips_everything() {
        let f = fixture(GatewayConfig::default());
        let mut sub = f.hub.subscribe();

        let mut req = request("ERR-106");
        req.dlr_url = "http://127.0.0.1:1/dlr".into();
        let outcome = f.processor.handle(req).await;

        assert_eq!(fault_code(&outcome), Some("106"));
        assert_eq!(
            outcome,
            Outcome::Respond(SendResult::fault(Fault::from_code(faults::INVALID_RECEIVER)))
        );
        assert_eq!(f.processor.counter().current(), 0);

        // Barrier through the hub loop: nothing was published before it
        assert_eq!(f.hub.subscriber_count().await, 1);
        assert!(sub.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_missing_receiver_is_fault_110() {
        let f = fixture(GatewayConfig::default());
        let mut req = request("Hello");
        req.receiver.clear();
        assert_eq!(fault_code(&f.processor.handle(req).await), Some("110"));

        let mut req = request("");
        req.dlr_url = "http://127.0.0.1:1/dlr".into();
        assert_eq!(fault_code(&f.processor.handle(req).await), Some("110"));
    }

    #[tokio::test]
    async fn test_throttle_trips_on_request_after_limit() {
        let mut config = GatewayConfig::default();
        config.throttle.max_requests = 3;
        let f = fixture(config);

        for _ in 0..3 {
            assert!(fault_code(&f.processor.handle(request("hi")).await).is_none());
        }
        assert_eq!(fault_code(&f.processor.handle(request("hi")).await), Some("105"));
        assert_eq!(f.processor.counter().current(), 0);
        assert!(fault_code(&f.processor.handle(request("hi")).await).is_none());
    }

    #[tokio::test]
    async fn test_throttle_counts_invalid_requests() {
        let mut config = GatewayConfig::default();
        config.throttle.max_requests = 1;
        let f = fixture(config);

        let mut req = request("hi");
        req.sender.clear();
        assert_eq!(fault_code(&f.processor.handle(req).await), Some("110"));
        assert_eq!(fault_code(&f.processor.handle(request("hi")).await), Some("105"));
    }

    #[tokio::test]
    async fn test_too_long_is_fault_108_after_broadcast() {
        let f = fixture(GatewayConfig::default());
        let mut sub = f.hub.subscribe();

        let outcome = f.processor.handle(request(&"a".repeat(153 * 6 + 1))).await;
        assert_eq!(fault_code(&outcome), Some("108"));
        assert!(sub.receiver.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_abort_sentinel_yields_abort_outcome() {
        let f = fixture(GatewayConfig::default());
        let mut req = request("Hello");
        req.receiver = "41764986185".into();

        match f.processor.handle(req).await {
            Outcome::Abort { accepted, reason } => {
                assert_eq!(accepted.num_parts, 1);
                assert_eq!(reason, "Panic on receiver [41764986185]");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_response_sentinel_waits() {
        let mut config = GatewayConfig::default();
        config.simulation.slow_response = Sentinel::text("timeout");
        let f = fixture(config);

        let started = tokio::time::Instant::now();
        let outcome = f.processor.handle(request("timeout")).await;
        assert!(matches!(outcome, Outcome::Respond(SendResult::Success(_))));
        assert!(started.elapsed() >= Duration::from_secs(45));
    }

    #[tokio::test]
    async fn test_plan_delivery_defaults() {
        let f = fixture(GatewayConfig::default());
        let mut req = request("Hello");
        req.dlr_url = "http://client/dlr".into();
        let accepted = Accepted {
            msg_id: "m-1".into(),
            num_parts: 2,
        };

        let job = f
            .processor
            .plan_delivery(&req, &PatternMatch::default(), &accepted)
            .unwrap();
        assert_eq!(job.url, "http://client/dlr");
        assert_eq!(job.delay, Duration::from_secs(2));
        assert_eq!(job.template, DeliveryReport::delivered("m-1", 2, "acme"));
    }

    #[tokio::test]
    async fn test_plan_delivery_applies_overrides() {
        let f = fixture(GatewayConfig::default());
        let matcher = FaultPatternMatcher::new(&GatewayConfig::default().simulation);
        let mut req = request("DLR-UNDELIVERED-995 DLR-DELAYED-5");
        req.dlr_url = "http://client/dlr".into();
        let matched = matcher.inspect(&req.receiver, &req.text);
        let accepted = Accepted {
            msg_id: "m-2".into(),
            num_parts: 1,
        };

        let job = f.processor.plan_delivery(&req, &matched, &accepted).unwrap();
        assert_eq!(job.delay, Duration::from_secs(5));
        assert_eq!(job.template.event, "UNDELIVERED");
        assert_eq!(job.template.error_code, 995);
        assert_eq!(job.template.error_message, "Message rejected by operator.");
    }

    #[tokio::test]
    async fn test_no_callback_url_means_no_job() {
        let f = fixture(GatewayConfig::default());
        let accepted = Accepted {
            msg_id: "m-3".into(),
            num_parts: 1,
        };
        assert!(f
            .processor
            .plan_delivery(&request("Hello"), &PatternMatch::default(), &accepted)
            .is_none());
    }
}
