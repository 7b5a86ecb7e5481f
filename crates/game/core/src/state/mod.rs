//! Battle state representation.
//!
//! This module owns the data structures that describe combatants, their status
//! effects and the session that holds both rosters. Runtime layers clone or
//! query this state but mutate it exclusively through the engine (or, on a
//! follower, by applying host snapshots).
mod combatant;
mod ids;
mod session;
#[cfg(feature = "serde")]
mod snapshot;
mod status;
mod template;

pub use combatant::{Combatant, PassiveMarks, ResourceError, ResourcePool, Resources, Side};
pub use ids::{InstanceId, PartyOrigin};
pub use session::{
    AuthorityRole, BattleMode, BattleOutcome, BattlePhase, BattleSession, Parties, Resolution,
    ResolutionReason, SessionError,
};
#[cfg(feature = "serde")]
pub use snapshot::{CombatantSnapshot, GameStateSnapshot, SnapshotError, StateRoot};
pub use status::{Applied, StatusEffect, StatusEffectKind, StatusEffects};
pub use template::{CharacterTemplate, PartyError, instantiate_party};

#[cfg(test)]
pub(crate) use combatant::fixtures;
