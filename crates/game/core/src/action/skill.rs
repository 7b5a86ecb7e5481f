//! Skill definitions.
//!
//! A skill is data: a cost, a target scope and a [`SkillRoutine`] key. The
//! behaviour behind the key lives in the [`SkillRegistry`](super::SkillRegistry).

use crate::combat::{BASIC_POWER, DamageType};
use crate::state::StatusEffectKind;

/// Which combatants a skill may affect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TargetScope {
    SingleEnemy,
    AllEnemies,
    SingleAlly,
    AllAllies,
    Caster,
    /// A defeated member of the caster's party.
    DefeatedAlly,
}

impl TargetScope {
    /// Whether the intent must name a target.
    pub const fn needs_target(self) -> bool {
        matches!(
            self,
            TargetScope::SingleEnemy | TargetScope::SingleAlly | TargetScope::DefeatedAlly
        )
    }

    /// Whether a taunt can pull this action onto another combatant.
    pub const fn is_single_hostile(self) -> bool {
        matches!(self, TargetScope::SingleEnemy)
    }
}

/// Closed set of effect routines a skill can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::EnumIter, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum SkillRoutine {
    /// One or more hits per target.
    Damage,
    /// Hits, then applies the skill's status to targets still standing.
    DamageWithStatus,
    /// Heals by `support × power / 100`.
    Heal,
    /// Applies the skill's status only.
    ApplyStatus,
    /// Hits and heals the caster a share of the damage dealt.
    Drain,
    /// Brings a defeated ally back at `power` percent of max HP.
    Revive,
    /// Removes every harmful effect.
    Cleanse,
    /// Hits every enemy, then the caster drops to 0 HP.
    SelfDestruct,
}

/// Status a skill applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusSpec {
    pub kind: StatusEffectKind,
    pub duration: i32,
    pub magnitude: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skill {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mp_cost: u32,
    pub scope: TargetScope,
    pub routine: SkillRoutine,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage_type: DamageType,
    /// Percent of the relevant stat.
    #[cfg_attr(feature = "serde", serde(default = "default_power"))]
    pub power: u32,
    #[cfg_attr(feature = "serde", serde(default = "default_hits"))]
    pub hits: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: Option<StatusSpec>,
}

#[cfg(feature = "serde")]
fn default_power() -> u32 {
    BASIC_POWER
}

#[cfg(feature = "serde")]
fn default_hits() -> u32 {
    1
}

impl Skill {
    pub fn new(name: impl Into<String>, routine: SkillRoutine, scope: TargetScope) -> Self {
        Self {
            name: name.into(),
            mp_cost: 0,
            scope,
            routine,
            damage_type: DamageType::Physical,
            power: BASIC_POWER,
            hits: 1,
            status: None,
        }
    }

    pub fn cost(mut self, mp: u32) -> Self {
        self.mp_cost = mp;
        self
    }

    pub fn power(mut self, power: u32) -> Self {
        self.power = power;
        self
    }

    pub fn hits(mut self, hits: u32) -> Self {
        self.hits = hits.max(1);
        self
    }

    pub fn magical(mut self) -> Self {
        self.damage_type = DamageType::Magical;
        self
    }

    pub fn with_status(mut self, kind: StatusEffectKind, duration: i32, magnitude: i32) -> Self {
        self.status = Some(StatusSpec {
            kind,
            duration,
            magnitude,
        });
        self
    }
}
