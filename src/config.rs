//! Environment-driven configuration.
//!
//! All settings come from environment variables (optionally via a `.env`
//! file loaded in `main`): `PORT`, `SESSIONS_ROOT`, and
//! `ARCHIVE_DELAY_MS`. Every value has a default, so a bare environment
//! yields a working broker on port 3000.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default listen port when `PORT` is unset.
const DEFAULT_PORT: u16 = 3000;

/// Default root directory for per-session working directories.
const DEFAULT_SESSIONS_ROOT: &str = "generated_sessions";

/// Default grace delay before a session's working directory is archived.
const DEFAULT_ARCHIVE_DELAY_MS: u64 = 2000;

/// Runtime configuration for the broker.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port the HTTP server binds to.
    pub port: u16,
    /// Root directory holding one working directory per pairing session.
    pub sessions_root: PathBuf,
    /// Grace delay between session creation and the archival snapshot.
    pub archive_delay: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_port(env_opt("PORT").as_deref())?;
        let sessions_root = env_opt("SESSIONS_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSIONS_ROOT));
        let archive_delay = parse_delay_ms(env_opt("ARCHIVE_DELAY_MS").as_deref())?;

        Ok(Self {
            port,
            sessions_root,
            archive_delay,
        })
    }
}

/// Read an environment variable, treating empty values as unset.
fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_port(raw: Option<&str>) -> Result<u16, ConfigError> {
    match raw {
        None => Ok(DEFAULT_PORT),
        Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
            key: "PORT".to_string(),
            message: format!("expected a port number, got '{v}'"),
        }),
    }
}

fn parse_delay_ms(raw: Option<&str>) -> Result<Duration, ConfigError> {
    match raw {
        None => Ok(Duration::from_millis(DEFAULT_ARCHIVE_DELAY_MS)),
        Some(v) => v
            .parse()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidValue {
                key: "ARCHIVE_DELAY_MS".to_string(),
                message: format!("expected milliseconds, got '{v}'"),
            }),
    }
}
