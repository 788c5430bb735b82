//! HTTP surface for the pairing broker.
//!
//! Routes:
//! - `POST /api/pair` - start a pairing attempt for a phone number
//! - `GET /api/status/{token}` - poll session state
//! - `GET /api/download/{token}` - fetch the archived session directory
//!
//! The server follows the bind-then-spawn pattern: `start()` binds the
//! listener (so tests can use port 0) and spawns the serve task with a
//! oneshot-driven graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::error::{PairingError, ServerError};
use crate::pairing::PairingService;

/// Configuration for the pairing server.
pub struct ServerConfig {
    /// Address to bind the server to.
    pub addr: SocketAddr,
}

/// The broker's HTTP server.
pub struct PairingServer {
    config: ServerConfig,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PairingServer {
    /// Create a server with the given bind address. Nothing is bound until
    /// `start()`.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            local_addr: None,
            shutdown_tx: None,
            handle: None,
        }
    }

    /// Bind the listener and spawn the serve task.
    pub async fn start(&mut self, app: Router) -> Result<(), ServerError> {
        let listener = tokio::net::TcpListener::bind(self.config.addr)
            .await
            .map_err(|e| ServerError::StartupFailed {
                reason: format!("Failed to bind to {}: {}", self.config.addr, e),
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::StartupFailed {
                reason: format!("Failed to resolve local address: {e}"),
            })?;
        self.local_addr = Some(local_addr);

        tracing::info!("Pairing server listening on {}", local_addr);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                    tracing::info!("Pairing server shutting down");
                })
                .await
            {
                tracing::error!("Pairing server error: {}", e);
            }
        });

        self.handle = Some(handle);
        Ok(())
    }

    /// Address the server actually bound to. `None` before `start()`.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Signal graceful shutdown and wait for the serve task to finish.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

/// Build the broker's route table over a shared service.
pub fn routes(service: Arc<PairingService>) -> Router {
    Router::new()
        .route("/api/pair", post(start_pairing))
        .route("/api/status/{token}", get(pairing_status))
        .route("/api/download/{token}", get(download_session))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct PairRequest {
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Serialize)]
struct PairResponse {
    token: String,
    message: &'static str,
    code: String,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    phone: String,
    code: String,
    connected: bool,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(err: PairingError) -> Response {
    let status = match &err {
        PairingError::PhoneRequired | PairingError::NotReady { .. } => StatusCode::BAD_REQUEST,
        PairingError::NotFound { .. } => StatusCode::NOT_FOUND,
        PairingError::Upstream { .. } | PairingError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// POST /api/pair - start pairing a phone number.
async fn start_pairing(
    State(service): State<Arc<PairingService>>,
    Json(req): Json<PairRequest>,
) -> Response {
    match service.create(req.phone.as_deref().unwrap_or_default()).await {
        Ok(created) => (
            StatusCode::OK,
            Json(PairResponse {
                token: created.token,
                message: "pairing started",
                code: created.code,
            }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

/// GET /api/status/{token} - poll session state.
async fn pairing_status(
    State(service): State<Arc<PairingService>>,
    Path(token): Path<String>,
) -> Response {
    match service.status(&token).await {
        Ok(status) => (
            StatusCode::OK,
            Json(StatusResponse {
                phone: status.phone,
                code: status.code,
                connected: status.connected,
            }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

/// GET /api/download/{token} - fetch the archived session directory.
async fn download_session(
    State(service): State<Arc<PairingService>>,
    Path(token): Path<String>,
) -> Response {
    match service.download(&token).await {
        Ok(blob) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/zip".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={token}.zip"),
                ),
            ],
            blob,
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}
