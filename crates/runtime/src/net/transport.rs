use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The peer (or the local side) closed the link.
    #[error("transport closed")]
    Closed,

    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Ordered, reliable frame channel to one peer.
///
/// Frames arrive in the order they were sent. `recv` returning `None` is the
/// disconnect notification: no further frames will arrive.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError>;

    /// Next inbound frame, or `None` once the peer is gone.
    ///
    /// Must be cancel safe: dropping the future before it completes loses no
    /// frame.
    async fn recv(&mut self) -> Option<Vec<u8>>;

    async fn close(&mut self);
}

/// Opens a transport to whoever else joins `room`.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, room: &str) -> Result<Box<dyn Transport>, TransportError>;
}
