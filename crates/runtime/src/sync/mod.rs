//! Host-authoritative sync protocol.
//!
//! ```text
//! host                                  follower
//!  ── party_data ──────────────────────▶
//!  ◀────────────────────── party_data ──
//!  ── start_battle ────────────────────▶
//!  per turn of a follower combatant:
//!  ── request_action ──────────────────▶
//!  ◀─────────────────── execute_action ──
//!  per resolved action (either side):
//!  ── execute_action, log_message*, sync_game_state ─▶
//!  ── battle_end ──────────────────────▶   (or ◀── when the follower leaves)
//! ```
//!
//! Only the host resolves actions and rolls randomness. The follower replaces
//! its view with every `sync_game_state` it receives.

mod codec;
mod follower;
mod host;
mod message;
mod remote;
mod router;

pub use codec::{CodecError, MAX_FRAME_BYTES, decode, encode};
pub use follower::FollowerSession;
pub use host::handshake;
pub use message::NetworkMessage;
pub use remote::{RemotePeer, TurnInput};
pub use router::{Directive, Routed, SyncError, route};
