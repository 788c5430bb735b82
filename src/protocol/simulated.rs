//! In-process connector used for local development and tests.
//!
//! Stands in for a real wire-protocol client: issues a random 8-character
//! pairing code, writes credential files into the session directory, and
//! reports the connection as open after a configurable delay. The file
//! shapes loosely mirror what a multi-file auth store would persist.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::mpsc;

use crate::error::PairingError;
use crate::protocol::connector::{ConnectionEvent, PairingHandshake, ProtocolConnector};

/// Characters a pairing code is drawn from.
const CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a raw pairing code.
const CODE_LEN: usize = 8;

/// Connector that fakes the handshake locally.
#[derive(Debug, Clone)]
pub struct SimulatedConnector {
    connect_delay: Duration,
}

impl SimulatedConnector {
    /// Create a connector that reports the connection open after
    /// `connect_delay`.
    pub fn new(connect_delay: Duration) -> Self {
        Self { connect_delay }
    }
}

impl Default for SimulatedConnector {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

#[async_trait]
impl ProtocolConnector for SimulatedConnector {
    async fn begin_pairing(
        &self,
        session_dir: &Path,
        phone: &str,
    ) -> Result<PairingHandshake, PairingError> {
        let raw_code = generate_raw_code();

        let creds = serde_json::json!({
            "phone": phone,
            "registered": false,
            "noise_key": random_key_hex(),
            "identity_key": random_key_hex(),
            "issued_at": chrono::Utc::now().to_rfc3339(),
        });
        let payload =
            serde_json::to_vec_pretty(&creds).map_err(|e| PairingError::Upstream {
                reason: format!("failed to encode credentials: {e}"),
            })?;
        std::fs::write(session_dir.join("creds.json"), payload).map_err(|e| {
            PairingError::Upstream {
                reason: format!("failed to persist credentials: {e}"),
            }
        })?;

        let (tx, rx) = mpsc::channel(8);
        let delay = self.connect_delay;
        let dir = session_dir.to_path_buf();
        let phone = phone.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // A real client keeps persisting state after the code is
            // entered; write one more file so snapshots taken after the
            // connection opens differ from the initial credentials.
            let sync = serde_json::json!({
                "phone": phone,
                "registered": true,
                "synced_at": chrono::Utc::now().to_rfc3339(),
            });
            if let Ok(payload) = serde_json::to_vec_pretty(&sync) {
                let _ = std::fs::write(dir.join("app-state-sync.json"), payload);
            }

            let _ = tx.send(ConnectionEvent::Open).await;
        });

        Ok(PairingHandshake {
            raw_code,
            events: rx,
        })
    }
}

fn generate_raw_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_CHARS[rng.gen_range(0..CODE_CHARS.len())] as char)
        .collect()
}

fn random_key_hex() -> String {
    let mut key = [0u8; 32];
    rand::thread_rng().fill(&mut key);
    key.iter().map(|b| format!("{b:02x}")).collect()
}
