//! Detached, per-part delivery report sender.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::task::JoinHandle;

use crate::config::DlrConfig;
use crate::dlr::report::DeliveryReport;
use crate::observability::metrics;

/// Error type for a single callback attempt.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("callback request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("callback answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("callback task panicked: {0}")]
    Panicked(String),
}

/// Everything a pending delivery needs, owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DlrJob {
    pub url: String,
    pub template: DeliveryReport,
    pub delay: Duration,
}

/// Outcome counts of one job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: usize,
}

/// Sends delivery reports to client callback URLs.
#[derive(Clone)]
pub struct DlrDispatcher {
    client: reqwest::Client,
}

impl DlrDispatcher {
    pub fn new(config: &DlrConfig) -> Result<Self, DispatchError> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs);
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(DispatchError::Client)?;
        Ok(Self { client })
    }

    /// Run `job` on its own task. The handle can be dropped; the task keeps running.
    pub fn schedule(&self, job: DlrJob) -> JoinHandle<DispatchSummary> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.dispatch(job).await })
    }

    /// Wait the job's delay, then send one report per part in order.
    pub async fn dispatch(&self, job: DlrJob) -> DispatchSummary {
        tracing::info!(
            url = %job.url,
            msg_id = %job.template.msg_id,
            parts = job.template.num_parts,
            delay = ?job.delay,
            "Sending DLR notification"
        );
        tokio::time::sleep(job.delay).await;

        let mut summary = DispatchSummary::default();
        for part_num in 0..job.template.num_parts {
            let report = job.template.for_part(part_num);

            // A panic while sending must stay inside this task
            let attempt = AssertUnwindSafe(self.send_part(&job.url, &report))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(DispatchError::Panicked(panic_message(panic.as_ref()))));

            match attempt {
                Ok(()) => {
                    summary.sent += 1;
                    metrics::record_dlr_callback("sent");
                }
                Err(e) => {
                    summary.failed += 1;
                    metrics::record_dlr_callback("failed");
                    tracing::warn!(
                        url = %job.url,
                        msg_id = %report.msg_id,
                        part_num,
                        error = %e,
                        "DLR notification failed"
                    );
                }
            }
        }

        tracing::debug!(
            msg_id = %job.template.msg_id,
            sent = summary.sent,
            failed = summary.failed,
            "DLR job finished"
        );
        summary
    }

    async fn send_part(&self, url: &str, report: &DeliveryReport) -> Result<(), DispatchError> {
        let response = self.client.post(url).json(report).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DispatchError::Status(status))
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
