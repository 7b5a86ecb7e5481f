//! Runtime orchestration for turn-based battles.
//!
//! This crate wires the deterministic rules from `battle-core` to the outside
//! world: action providers, an event bus, and the host-authoritative sync
//! protocol for networked matches. Consumers embed [`BattleRunner`] to drive a
//! local match or the host side of a networked one, and [`FollowerSession`]
//! for the non-authoritative side.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the round loop and its builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`net`] defines the transport contract and an in-memory loopback
//! - [`sync`] holds the wire messages, codec, router and peer drivers
pub mod api;
pub mod config;
pub mod events;
pub mod net;
pub mod rng;
pub mod runtime;
pub mod sync;

pub use api::{
    ActionProvider, ChannelProvider, ProviderKind, Result, RuntimeError, ScriptedProvider,
};
pub use config::RuntimeConfig;
pub use events::{BattleEvent, EventBus, SkipReason, Topic};
pub use net::{Connector, LoopbackHub, LoopbackTransport, Transport, TransportError};
pub use rng::StdCombatRng;
pub use runtime::{BattleRunner, BattleRunnerBuilder, BattleSummary};
pub use sync::{
    CodecError, Directive, FollowerSession, NetworkMessage, RemotePeer, Routed, SyncError, route,
};
