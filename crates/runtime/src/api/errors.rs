//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from action providers, the peer link and session setup so
//! clients can bubble them up with consistent context. Rule violations inside
//! a battle are not errors here: the round loop recovers from them in place.
use std::fmt;

use battle_core::{InstanceId, PartyError, SessionError, SnapshotError};
use thiserror::Error;

use crate::net::TransportError;
use crate::sync::{CodecError, SyncError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{kind} action provider not set")]
    ProviderNotSet { kind: ProviderKind },

    #[error("no opponent configured: set an opponent party or a remote peer")]
    MissingOpponent,

    #[error("action provider channel closed")]
    ActionProviderChannelClosed,

    /// Cancelled before the battle became active.
    #[error("battle cancelled before it started")]
    Cancelled,

    /// Malformed or out-of-order message. Logged and discarded by the
    /// drivers; surfaced only when it makes the handshake impossible.
    #[error("protocol violation: {0}")]
    ProtocolViolation(#[from] SyncError),

    #[error("peer disconnected")]
    PeerDisconnected,

    #[error("timed out waiting for {actor}'s action")]
    RemoteTimeout { actor: InstanceId },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("failed to build party")]
    Party(#[from] PartyError),

    #[error("invalid session setup")]
    Session(#[from] SessionError),

    #[error("failed to snapshot battle state")]
    Snapshot(#[from] SnapshotError),
}

/// Which seat a provider serves.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    Own,
    Opponent,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderKind::Own => "own",
            ProviderKind::Opponent => "opponent",
        };
        write!(f, "{}", label)
    }
}
