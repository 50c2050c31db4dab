//! Send-SMS endpoint.
//!
//! # Responsibilities
//! - Decode JSON (or legacy URL-encoded) bodies into `SendRequest`
//! - Hand the request to the `RequestProcessor` on its own task
//! - Map the outcome to HTTP: 202 success, 420 fault, or an aborted task

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use futures_util::{future, stream, StreamExt};

use crate::config::AbortStage;
use crate::gateway::faults;
use crate::gateway::{Accepted, Fault, LegacyForm, Outcome, SendRequest, SendResult};
use crate::http::server::AppState;
use crate::observability::metrics;

/// Nonstandard status every fault is answered with.
pub const FAULT_STATUS: u16 = 420;

impl IntoResponse for SendResult {
    fn into_response(self) -> Response {
        let status = if self.is_success() {
            StatusCode::ACCEPTED
        } else {
            StatusCode::from_u16(FAULT_STATUS).unwrap_or(StatusCode::BAD_REQUEST)
        };
        (status, Json(self)).into_response()
    }
}

pub async fn send_sms(State(state): State<AppState>, request: Request) -> Response {
    let request_id = request_id(request.headers());

    let send_request = match decode(request, state.config.security.max_body_size).await {
        Ok(r) => r,
        Err(fault) => {
            metrics::record_request("bad_format");
            return SendResult::fault(fault).into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        sender = %send_request.sender,
        receiver = %send_request.receiver,
        "Bulk request decoded"
    );

    // Detached from the connection; a client hang-up never cancels processing
    let processor = state.processor.clone();
    let outcome = match tokio::spawn(async move { processor.handle(send_request).await }).await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Bulk request task failed");
            metrics::record_request("internal_error");
            return SendResult::fault(Fault::from_code(faults::INTERNAL_ERROR)).into_response();
        }
    };

    match outcome {
        Outcome::Respond(result) => result.into_response(),
        Outcome::Abort { accepted, reason } => {
            abort(state.config.simulation.abort_stage, accepted, reason)
        }
    }
}

fn request_id(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// Any decoding problem is fault 109.
async fn decode(request: Request, limit: usize) -> Result<SendRequest, Fault> {
    if is_form(request.headers()) {
        return match Form::<LegacyForm>::from_request(request, &()).await {
            Ok(Form(form)) => Ok(form.into()),
            Err(e) => {
                tracing::info!(error = %e, "Bulk request invalid");
                Err(Fault::bad_format())
            }
        };
    }

    let body = axum::body::to_bytes(request.into_body(), limit)
        .await
        .map_err(|e| {
            tracing::info!(error = %e, "Bulk request body unreadable");
            Fault::bad_format()
        })?;

    tracing::debug!(body = %String::from_utf8_lossy(&body), "Bulk server request raw body");

    serde_json::from_slice(&body).map_err(|e| {
        tracing::info!(error = %e, "Bulk request invalid");
        Fault::bad_format()
    })
}

/// Unwind the request task, before or after the success body.
fn abort(stage: AbortStage, accepted: Accepted, reason: String) -> Response {
    tracing::error!(msg_id = %accepted.msg_id, reason = %reason, stage = ?stage, "Aborting request task");

    match stage {
        AbortStage::BeforeResponse => panic!("{reason}"),
        AbortStage::AfterResponse => {
            let body = match serde_json::to_vec(&accepted) {
                Ok(body) => Bytes::from(body),
                Err(_) => Bytes::new(),
            };
            let chunks = stream::once(future::ready(Ok(body)))
                .chain(stream::once(async move { unwind_body(reason) }));
            (
                StatusCode::ACCEPTED,
                [(header::CONTENT_TYPE, "application/json")],
                Body::from_stream(chunks),
            )
                .into_response()
        }
    }
}

fn unwind_body(reason: String) -> Result<Bytes, std::io::Error> {
    panic!("{reason}")
}
