//! Session records and the concurrency-safe registry.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// One pairing attempt, keyed by its token.
///
/// `connected` and `archive` advance on unrelated triggers (a connection
/// event and the deferred snapshot), so they are independent flags rather
/// than a single linear state. Both are monotonic: `connected` never
/// regresses and `archive` is written at most once.
#[derive(Debug, Clone)]
pub struct PairingSession {
    /// Opaque unique handle, also the working-directory name.
    pub token: String,
    /// Caller-supplied phone number, not validated for format.
    pub phone: String,
    /// Human-enterable pairing code, formatted for display.
    pub code: String,
    /// Whether a connection-open event has been observed.
    pub connected: bool,
    /// Zip snapshot of the working directory, once produced.
    pub archive: Option<Bytes>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

impl PairingSession {
    pub fn new(token: String, phone: String, code: String) -> Self {
        Self {
            token,
            phone,
            code,
            connected: false,
            archive: None,
            created_at: Utc::now(),
        }
    }
}

/// Format a raw pairing code into groups of 4 joined by hyphens.
///
/// Codes of 4 characters or fewer pass through unchanged.
pub fn format_pairing_code(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() <= 4 {
        return raw.to_string();
    }
    chars
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

/// Token -> session map shared by request handlers, connection-event
/// listeners, and archival tasks.
///
/// Constructed per service instance and injected, never global. Uses
/// `Arc<RwLock<HashMap>>` for concurrent access from multiple async tasks.
/// No eviction: sessions live for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct PairingRegistry {
    sessions: Arc<RwLock<HashMap<String, PairingSession>>>,
}

impl PairingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session under its token.
    pub async fn insert(&self, session: PairingSession) {
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session);
    }

    /// Look up a session by token. Returns a clone; the archive payload is
    /// `Bytes`, so the clone is cheap.
    pub async fn get(&self, token: &str) -> Option<PairingSession> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Flip the session's connected flag. Returns `true` only on the first
    /// flip; later calls (duplicate open events) are no-ops.
    pub async fn mark_connected(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(token) {
            Some(session) if !session.connected => {
                session.connected = true;
                true
            }
            _ => false,
        }
    }

    /// Store the archive blob if none is set yet. Returns `false` when the
    /// session is unknown or already archived, keeping archival at most
    /// once per session.
    pub async fn set_archive(&self, token: &str, blob: Bytes) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(token) {
            Some(session) if session.archive.is_none() => {
                session.archive = Some(blob);
                true
            }
            _ => false,
        }
    }

    /// Number of registered sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
