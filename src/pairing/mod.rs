//! Pairing-session lifecycle: records, registry, and orchestration.
//!
//! A session moves through {created -> code issued -> connected | pending}
//! while, on an unrelated clock, a deferred snapshot of its working
//! directory makes it downloadable. The registry is the only shared mutable
//! state in the broker.

mod service;
mod session;

pub use service::{CreatedPairing, PairingService, PairingStatus};
pub use session::{PairingRegistry, PairingSession, format_pairing_code};
