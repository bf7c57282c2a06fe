//! WebSocket transport and HTTP endpoints
//!
//! - `GET /ws`: the deck protocol, one task per connection
//! - `GET /health`: liveness plus macro and session counts
//! - `/icon/*`: always 404; the UI falls back to text labels
//! - everything else: the web UI from the static directory, if configured

mod websocket;

use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::dispatch::Dispatcher;
use crate::{Error, Result};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Loaded macros
    pub macros: usize,
    /// Open connections
    pub sessions: usize,
}

/// Liveness probe
async fn health(State(dispatcher): State<Arc<Dispatcher>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        macros: dispatcher.registry().len(),
        sessions: dispatcher.sessions().len().await,
    })
}

/// Macro deck server
#[derive(Debug)]
pub struct DeckServer {
    dispatcher: Arc<Dispatcher>,
    bind_addr: String,
    static_dir: Option<PathBuf>,
}

impl DeckServer {
    /// Create a server for `dispatcher`
    #[must_use]
    pub const fn new(dispatcher: Arc<Dispatcher>, bind_addr: String) -> Self {
        Self {
            dispatcher,
            bind_addr,
            static_dir: None,
        }
    }

    /// Serve the web UI from `dir`
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/ws", get(websocket::ws_upgrade))
            .route("/health", get(health))
            .route("/icon/{*name}", get(|| async { StatusCode::NOT_FOUND }))
            .with_state(Arc::clone(&self.dispatcher));

        // Serve static files if configured
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir = ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        router.layer(TraceLayer::new_for_http())
    }

    /// Bind and serve until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns error if the server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .map_err(|e| Error::Config(format!("failed to bind {}: {e}", self.bind_addr)))?;

        let host = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());

        tracing::info!(
            addr = %self.bind_addr,
            %host,
            macros = self.dispatcher.registry().len(),
            auth_required = self.dispatcher.auth_required(),
            "macro deck listening"
        );

        if let Ok(local) = listener.local_addr() {
            log_client_urls(local);
        }

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// # Errors
    ///
    /// Returns error if the server fails while running
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let app = self.router();

        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| Error::Config(format!("server error: {e}")))?;

        tracing::info!("macro deck stopped");
        Ok(())
    }
}

/// Log the `/ws` URL reachable on each IPv4 interface
fn log_client_urls(local: SocketAddr) {
    let interfaces = match if_addrs::get_if_addrs() {
        Ok(interfaces) => interfaces,
        Err(e) => {
            tracing::warn!(error = %e, "could not list network interfaces");
            return;
        }
    };

    let ipv4: Vec<(String, Ipv4Addr)> = interfaces
        .into_iter()
        .filter_map(|iface| match iface.ip() {
            IpAddr::V4(ip) => Some((iface.name, ip)),
            IpAddr::V6(_) => None,
        })
        .collect();

    for (interface, ip, url) in client_urls(local, &ipv4) {
        tracing::info!(%interface, %ip, %url, "clients can connect");
    }
}

/// WebSocket URLs for a server bound to `local`
///
/// A wildcard bind is reachable on every interface; a specific address only
/// on the interface that carries it.
fn client_urls(
    local: SocketAddr,
    interfaces: &[(String, Ipv4Addr)],
) -> Vec<(String, Ipv4Addr, String)> {
    let port = local.port();
    interfaces
        .iter()
        .filter(|(_, ip)| local.ip().is_unspecified() || local.ip() == IpAddr::V4(*ip))
        .map(|(name, ip)| (name.clone(), *ip, format!("ws://{ip}:{port}/ws")))
        .collect()
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received Ctrl-C, shutting down"),
        Err(e) => tracing::error!(error = %e, "failed to listen for Ctrl-C"),
    }
}
