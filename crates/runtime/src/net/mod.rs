//! Peer link abstraction.
//!
//! The sync protocol only needs an ordered, reliable byte channel per peer.
//! [`Transport`] is that contract; [`Connector`] turns a room identifier into a
//! connected transport. An in-memory [`LoopbackTransport`] backs tests and the
//! demo binary.

mod loopback;
mod transport;

pub use loopback::{LoopbackHub, LoopbackTransport};
pub use transport::{Connector, Transport, TransportError};
