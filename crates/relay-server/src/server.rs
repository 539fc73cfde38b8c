//! `RelayServer` — axum HTTP + `WebSocket` front for the session relay.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::RelayConfig;
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::gateway::ws_handler;
use crate::websocket::registry::SessionRegistry;

/// Shared state accessible from axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// All live sessions.
    pub registry: Arc<SessionRegistry>,
    /// Server configuration.
    pub config: Arc<RelayConfig>,
    /// Open connection count, members or not.
    pub connections: Arc<AtomicUsize>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started.
    pub start_time: Instant,
    /// Renders `/metrics`.
    pub metrics: PrometheusHandle,
}

/// The relay server.
pub struct RelayServer {
    config: RelayConfig,
    registry: Arc<SessionRegistry>,
    connections: Arc<AtomicUsize>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
    metrics: PrometheusHandle,
}

impl RelayServer {
    /// Create a new server with an empty session registry.
    pub fn new(config: RelayConfig, metrics: PrometheusHandle) -> Self {
        Self {
            config,
            registry: Arc::new(SessionRegistry::new()),
            connections: Arc::new(AtomicUsize::new(0)),
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
            metrics,
        }
    }

    /// Build the axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            registry: self.registry.clone(),
            config: Arc::new(self.config.clone()),
            connections: self.connections.clone(),
            shutdown: self.shutdown.clone(),
            start_time: self.start_time,
            metrics: self.metrics.clone(),
        };

        Router::new()
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/ws", get(ws_handler))
            .with_state(state)
    }

    /// Bind and serve.
    ///
    /// Port `0` auto-assigns; the bound address is returned together
    /// with the serve task handle. The task drains once the shutdown
    /// token fires.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener =
            tokio::net::TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        let token = self.shutdown.token();
        let handle = tokio::spawn(async move {
            let serve = axum::serve(listener, app)
                .with_graceful_shutdown(async move { token.cancelled().await });
            if let Err(e) = serve.await {
                error!(error = %e, "server exited with error");
            }
        });
        info!(%addr, "relay listening");
        Ok((addr, handle))
    }

    /// The session registry.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// The shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// The server configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = state.connections.load(Ordering::Relaxed);
    let sessions = state.registry.session_count();
    Json(health::health_check(state.start_time, connections, sessions))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.render()
}
