//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use mock_bulk_gateway::dlr::DeliveryReport;
use mock_bulk_gateway::{GatewayConfig, HttpServer, Shutdown};

/// Config suitable for tests: no static files, immediate DLRs, admin on.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.static_files.dir = None;
    config.dlr.default_delay_secs = 0;
    config.admin.enabled = true;
    config
}

/// Start the gateway on an ephemeral port.
pub async fn spawn_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Start a callback receiver that records every delivery report it gets.
pub async fn start_dlr_sink() -> (String, mpsc::UnboundedReceiver<DeliveryReport>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new()
        .route(
            "/dlr",
            post(
                |State(tx): State<mpsc::UnboundedSender<DeliveryReport>>,
                 Json(report): Json<DeliveryReport>| async move {
                    let _ = tx.send(report);
                    StatusCode::OK
                },
            ),
        )
        .with_state(tx);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{}/dlr", addr), rx)
}

/// Non-pooled client that ignores proxy settings from the environment.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

pub fn send_body(receiver: &str, text: &str, dlr_url: Option<&str>) -> Value {
    json!({
        "type": "text",
        "Auth": { "username": "acme", "password": "secret" },
        "sender": "ACME",
        "receiver": receiver,
        "dlrMask": if dlr_url.is_some() { 19 } else { 0 },
        "dlrUrl": dlr_url.unwrap_or(""),
        "text": text,
    })
}

/// Wait for the next report, failing the test instead of hanging.
pub async fn next_report(rx: &mut mpsc::UnboundedReceiver<DeliveryReport>) -> DeliveryReport {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for DLR")
        .expect("DLR sink closed")
}
