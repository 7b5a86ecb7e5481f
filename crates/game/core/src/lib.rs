//! Deterministic combat rules shared by every participant of a battle.
//!
//! `battle-core` defines the canonical rules (stats, status effects, passives,
//! skills, turn order, win conditions) and exposes pure APIs reused by the
//! runtime, the networked host and the networked follower. All session
//! mutation flows through [`engine::BattleEngine`]; followers only apply host
//! snapshots (see [`state::GameStateSnapshot`], behind the `serde` feature).
pub mod action;
pub mod combat;
pub mod config;
pub mod effect;
pub mod engine;
pub mod env;
pub mod error;
pub mod log;
pub mod state;
pub mod stats;

pub use action::{
    ActionError, ActionIntent, ActionKind, ActionReport, Skill, SkillEffect, SkillRegistry,
    SkillRoutine, StatusSpec, TargetScope, resolve_action,
};
pub use combat::{AttackResult, CombatEvent, DamageType, Strike, resolve_attack};
pub use config::BattleConfig;
pub use effect::{Passive, PassiveKind, PassiveRegistry};
pub use engine::{BattleEngine, RoundReport, TurnGate, evaluate_outcome};
pub use env::{CombatRng, PcgRng, Rulebook, SequenceRng};
pub use error::{BattleError, ErrorSeverity};
pub use log::{LogCategory, LogEntry};
#[cfg(feature = "serde")]
pub use state::{CombatantSnapshot, GameStateSnapshot, SnapshotError, StateRoot};
pub use state::{
    AuthorityRole, BattleMode, BattleOutcome, BattlePhase, BattleSession, CharacterTemplate,
    Combatant, InstanceId, Parties, PartyError, PartyOrigin, Resolution, ResolutionReason,
    ResourcePool, Resources, SessionError, Side, StatusEffect, StatusEffectKind, StatusEffects,
    instantiate_party,
};
pub use stats::{BaseStats, EffectiveStats, StatKind};
