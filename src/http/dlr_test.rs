//! Callback sink for manual client-side DLR testing.

use axum::{
    body::Bytes,
    http::{Method, StatusCode, Uri},
};

/// Log whatever arrives and answer 200.
pub async fn log_callback(method: Method, uri: Uri, body: Bytes) -> StatusCode {
    tracing::info!(
        method = %method,
        uri = %uri,
        body = %String::from_utf8_lossy(&body),
        "Bulk server DLR request raw"
    );
    StatusCode::OK
}
