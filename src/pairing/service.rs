//! Orchestration of the pairing lifecycle.
//!
//! `create` drives the whole arc: working directory, connector handshake,
//! code formatting, registration, a listener task for connection events,
//! and a one-shot deferred task that snapshots the directory into a
//! downloadable archive. `status` and `download` are pure reads against the
//! registry.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::archive;
use crate::error::PairingError;
use crate::pairing::session::{PairingRegistry, PairingSession, format_pairing_code};
use crate::protocol::{ConnectionEvent, ProtocolConnector};
use crate::store::SessionStore;

/// Result of a successful pairing request.
#[derive(Debug, Clone)]
pub struct CreatedPairing {
    pub token: String,
    pub code: String,
}

/// Point-in-time view of a session for status polls.
#[derive(Debug, Clone)]
pub struct PairingStatus {
    pub phone: String,
    pub code: String,
    pub connected: bool,
}

/// The pairing broker's business logic.
pub struct PairingService {
    registry: PairingRegistry,
    store: SessionStore,
    connector: Arc<dyn ProtocolConnector>,
    archive_delay: Duration,
}

impl PairingService {
    pub fn new(
        store: SessionStore,
        connector: Arc<dyn ProtocolConnector>,
        archive_delay: Duration,
    ) -> Self {
        Self {
            registry: PairingRegistry::new(),
            store,
            connector,
            archive_delay,
        }
    }

    /// The session registry. Exposed for inspection in tests and tooling.
    pub fn registry(&self) -> &PairingRegistry {
        &self.registry
    }

    /// Start a pairing attempt for `phone`.
    ///
    /// The session is registered only after the connector has issued a
    /// code, so concurrent status polls never observe a code-less session;
    /// a connector failure leaves no registry entry behind.
    pub async fn create(&self, phone: &str) -> Result<CreatedPairing, PairingError> {
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(PairingError::PhoneRequired);
        }

        let token = Uuid::new_v4().to_string();
        let session_dir = self.store.create_session_dir(&token)?;

        let handshake = match self.connector.begin_pairing(&session_dir, phone).await {
            Ok(handshake) => handshake,
            Err(err) => {
                // Nothing references the directory yet; best-effort cleanup.
                let _ = std::fs::remove_dir_all(&session_dir);
                tracing::error!(phone, error = %err, "pairing handshake failed");
                return Err(err);
            }
        };

        let code = format_pairing_code(&handshake.raw_code);
        self.registry
            .insert(PairingSession::new(
                token.clone(),
                phone.to_string(),
                code.clone(),
            ))
            .await;

        self.spawn_event_listener(token.clone(), handshake.events);
        self.spawn_deferred_archival(token.clone(), session_dir);

        tracing::info!(%token, phone, "pairing started");
        Ok(CreatedPairing { token, code })
    }

    /// Look up the current state of a session.
    pub async fn status(&self, token: &str) -> Result<PairingStatus, PairingError> {
        let session = self
            .registry
            .get(token)
            .await
            .ok_or_else(|| PairingError::NotFound {
                token: token.to_string(),
            })?;

        Ok(PairingStatus {
            phone: session.phone,
            code: session.code,
            connected: session.connected,
        })
    }

    /// Fetch the archived session directory for `token`.
    ///
    /// Distinguishes an unknown token (`NotFound`) from a session whose
    /// snapshot has not been taken yet (`NotReady`). Repeated calls after
    /// readiness return the same bytes.
    pub async fn download(&self, token: &str) -> Result<Bytes, PairingError> {
        let session = self
            .registry
            .get(token)
            .await
            .ok_or_else(|| PairingError::NotFound {
                token: token.to_string(),
            })?;

        session.archive.ok_or_else(|| PairingError::NotReady {
            token: token.to_string(),
        })
    }

    /// Forward connection updates from the connector into the registry.
    /// The task ends when the connector drops its sender.
    fn spawn_event_listener(&self, token: String, mut events: mpsc::Receiver<ConnectionEvent>) {
        let registry = self.registry.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    ConnectionEvent::Open => {
                        if registry.mark_connected(&token).await {
                            tracing::info!(%token, "connection open");
                        }
                    }
                    ConnectionEvent::Closed => {
                        tracing::debug!(%token, "connection closed");
                    }
                }
            }
        });
    }

    /// Arm the one-shot archival task.
    ///
    /// The delay is a heuristic grace period for the connector to finish
    /// persisting credentials; it fires regardless of connection outcome.
    /// A failed snapshot is logged and leaves the session permanently not
    /// ready, which is the documented behavior.
    fn spawn_deferred_archival(&self, token: String, session_dir: std::path::PathBuf) {
        let registry = self.registry.clone();
        let delay = self.archive_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match archive::snapshot_dir(&session_dir) {
                Ok(blob) => {
                    if registry.set_archive(&token, blob).await {
                        tracing::info!(%token, "session archived");
                    }
                }
                Err(err) => {
                    tracing::warn!(%token, error = %err, "session snapshot failed");
                }
            }
        });
    }
}
