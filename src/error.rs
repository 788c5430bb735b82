//! Error types for Pairgate.

/// Top-level error type for the broker.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pairing error: {0}")]
    Pairing(#[from] PairingError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by pairing operations.
///
/// The Display strings of the terminal variants double as the wire-level
/// `error` messages returned to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum PairingError {
    /// The caller supplied no phone number (or an empty one).
    #[error("phone required")]
    PhoneRequired,

    /// No session exists for the given token.
    #[error("not found")]
    NotFound { token: String },

    /// The session exists but its archive has not been produced yet.
    #[error("not ready")]
    NotReady { token: String },

    /// The protocol connector failed to initialize or to issue a code.
    #[error("{reason}")]
    Upstream { reason: String },

    /// Session working-directory creation failed.
    #[error("session storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// HTTP server lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Pairing server failed to start: {reason}")]
    StartupFailed { reason: String },
}
