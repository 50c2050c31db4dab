//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, panic containment, body limit)
//! - Start the hub loop alongside the server
//! - Serve until the shutdown signal fires

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{Response, StatusCode},
    response::IntoResponse,
    routing::{any, get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::config::GatewayConfig;
use crate::dlr::{DispatchError, DlrDispatcher};
use crate::gateway::{RequestCounter, RequestProcessor};
use crate::http::{bulk, dlr_test, websocket};
use crate::hub::{Hub, HubHandle};
use crate::lifecycle::shutdown::{recv_signal, Shutdown};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub processor: RequestProcessor,
    pub hub: HubHandle,
    pub config: Arc<GatewayConfig>,
}

/// HTTP server for the mock gateway.
pub struct HttpServer {
    router: Router,
    hub: Hub,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, DispatchError> {
        let config = Arc::new(config);

        // Initialize subsystems
        let (hub, hub_handle) = Hub::new(config.hub.subscriber_buffer);
        let counter = Arc::new(RequestCounter::new(config.throttle.max_requests));
        let dispatcher = DlrDispatcher::new(&config.dlr)?;
        let processor = RequestProcessor::new(&config, counter, hub_handle.clone(), dispatcher);

        let state = AppState {
            processor,
            hub: hub_handle,
            config: config.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, hub })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/bulk_server", post(bulk::send_sms))
            .route("/dlr_test", any(dlr_test::log_callback))
            .route("/ws", get(websocket::subscribe));

        if config.admin.enabled {
            router = router.merge(admin::setup_admin_router(state.clone()));
        }

        if let Some(dir) = &config.static_files.dir {
            router = router.fallback_service(ServeDir::new(dir));
        }

        router.with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CatchPanicLayer::custom(contain_panic))
                // Enforced while decoding so oversized bodies become fault 109
                .layer(DefaultBodyLimit::max(config.security.max_body_size))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "Mock bulk server running"
        );

        tokio::spawn(self.hub.run(shutdown.subscribe()));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(recv_signal(shutdown.subscribe()))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Keep an aborted request task from affecting anything but its own response.
fn contain_panic(panic: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "Request task aborted");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}
