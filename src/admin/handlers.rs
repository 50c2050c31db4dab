use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub subscribers: usize,
    pub throttle_counter: usize,
    pub throttle_limit: usize,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let counter = state.processor.counter();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        subscribers: state.hub.subscriber_count().await,
        throttle_counter: counter.current(),
        throttle_limit: counter.limit(),
    })
}
