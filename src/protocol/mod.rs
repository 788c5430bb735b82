//! Protocol connector boundary.
//!
//! The wire protocol that performs the actual device handshake lives behind
//! the [`ProtocolConnector`] trait: the broker hands it a working directory
//! and a phone number, and gets back a raw pairing code plus a stream of
//! connection updates. Credential persistence into the working directory is
//! entirely the connector's business.

mod connector;
pub mod simulated;

pub use connector::{ConnectionEvent, PairingHandshake, ProtocolConnector};
pub use simulated::SimulatedConnector;
