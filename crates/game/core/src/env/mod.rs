//! Read-only rules environment.
//!
//! The [`Rulebook`] bundles tunables and the typed behaviour registries so the
//! engine and resolver can reach everything they need through one reference.
//! Randomness is passed separately: only the authoritative participant holds
//! a [`CombatRng`].
mod rng;

pub use rng::{CombatRng, PcgRng, SequenceRng, shuffle};

use crate::action::SkillRegistry;
use crate::config::BattleConfig;
use crate::effect::PassiveRegistry;

/// Rules shared by every battle a participant runs.
#[derive(Clone, Debug)]
pub struct Rulebook {
    pub config: BattleConfig,
    pub skills: SkillRegistry,
    pub passives: PassiveRegistry,
}

impl Rulebook {
    pub fn new(config: BattleConfig, skills: SkillRegistry, passives: PassiveRegistry) -> Self {
        Self {
            config,
            skills,
            passives,
        }
    }

    /// Standard registries with the given tunables.
    pub fn with_config(config: BattleConfig) -> Self {
        Self::new(config, SkillRegistry::standard(), PassiveRegistry::standard())
    }
}

impl Default for Rulebook {
    fn default() -> Self {
        Self::with_config(BattleConfig::default())
    }
}
