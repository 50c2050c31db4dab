//! Live traffic over WebSocket.
//!
//! # Responsibilities
//! - Upgrade `/ws` connections
//! - Register one hub subscriber per connection
//! - Forward broadcast envelopes as text frames, ping idle peers
//! - Unregister when either side goes away
//!
//! # Data Flow
//! ```text
//! Hub ──mpsc──→ writer task ──text frames──→ Browser
//!                reader task ←──close/pong── Browser
//! ```

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};

use crate::http::server::AppState;
use crate::hub::{HubHandle, Subscription};

pub async fn subscribe(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let hub = state.hub.clone();
    let ping_interval = Duration::from_secs(state.config.hub.ping_interval_secs);
    ws.on_upgrade(move |socket| serve_subscriber(socket, hub, ping_interval))
}

async fn serve_subscriber(socket: WebSocket, hub: HubHandle, ping_interval: Duration) {
    let Subscription { id, mut receiver } = hub.subscribe();
    tracing::info!(subscriber = %id, "WebSocket observer connected");

    let (mut sink, mut stream) = socket.split();

    let mut writer = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(ping_interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                payload = receiver.recv() => match payload {
                    Some(payload) => {
                        if sink.send(Message::Text(payload.as_ref().into())).await.is_err() {
                            break;
                        }
                    }
                    None => {
                        // Dropped by the hub
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                },
                _ = ticker.tick() => {
                    if sink.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    let mut reader = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            if let Message::Close(_) = message {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    hub.unregister(id);
    tracing::info!(subscriber = %id, "WebSocket observer disconnected");
}
