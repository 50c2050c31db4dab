//! Mock SMS Bulk Gateway
//!
//! # Architecture Overview
//!
//! ```text
//!     Client                  ┌───────────────────────────────────────────────┐
//!     POST /bulk_server ─────▶│ http::bulk → gateway::RequestProcessor        │
//!     ◀── 202 / 420 ──────────│    ├─ patterns (sentinel tokens)              │
//!                             │    ├─ throttle (request counter)              │
//!                             │    ├─ sms::segments                           │
//!                             │    ├─ hub::publish ──────────▶ /ws observers  │
//!     ◀── POST dlrUrl ────────│    └─ dlr::DlrDispatcher (detached task)      │
//!                             └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use mock_bulk_gateway::config::{load_config, GatewayConfig};
use mock_bulk_gateway::lifecycle::{wait_for_signal, Shutdown};
use mock_bulk_gateway::observability::{logging, metrics};
use mock_bulk_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "mock-bulk-gateway")]
#[command(about = "Mock SMS bulk gateway for testing client integrations", long_about = None)]
struct Args {
    /// HTTP service address, overrides the config file.
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(addr) = args.addr {
        config.listener.bind_address = addr;
    }

    logging::init(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        throttle_limit = config.throttle.max_requests,
        max_segments = config.segments.max_segments,
        abort_stage = ?config.simulation.abort_stage,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
