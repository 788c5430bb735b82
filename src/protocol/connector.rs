//! The connector trait and its event types.

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::PairingError;

/// Connection-state updates pushed by a connector after the handshake
/// starts. Delivered as messages rather than callbacks so all session
/// mutation stays in one place on the receiving side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The remote service accepted the pairing and opened the connection.
    Open,
    /// The connection dropped. Informational; pairing state is not rolled
    /// back on close.
    Closed,
}

/// Result of starting a pairing handshake: the raw (unformatted) code and
/// the channel on which connection updates will arrive. The channel closes
/// when the connector stops producing events.
#[derive(Debug)]
pub struct PairingHandshake {
    pub raw_code: String,
    pub events: mpsc::Receiver<ConnectionEvent>,
}

/// A protocol client capable of pairing a phone number.
///
/// Implementations bind to `session_dir` and persist whatever credential
/// files the handshake produces into it, at their own pace; the broker
/// never inspects those files, it only snapshots the directory later.
#[async_trait]
pub trait ProtocolConnector: Send + Sync {
    /// Establish a client in `session_dir` and request a pairing code for
    /// `phone`. Failures map to [`PairingError::Upstream`].
    async fn begin_pairing(
        &self,
        session_dir: &Path,
        phone: &str,
    ) -> Result<PairingHandshake, PairingError>;
}
