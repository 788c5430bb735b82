//! Pairgate: an HTTP broker for short-lived device pairing sessions.
//!
//! A caller POSTs a phone number, the broker drives a handshake through a
//! protocol connector, hands back a human-enterable pairing code, tracks
//! connection progress, and after a grace delay snapshots the session's
//! credential directory into a downloadable zip.
//!
//! Known limitation: sessions and their working directories are retained
//! for the process lifetime; there is no eviction or cancellation.

pub mod archive;
pub mod config;
pub mod error;
pub mod pairing;
pub mod protocol;
pub mod server;
pub mod store;

pub use error::Error;
