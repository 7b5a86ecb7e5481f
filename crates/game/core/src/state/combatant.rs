//! Combatant model: immutable identity plus mutable per-battle state.
//!
//! HP and MP bounds are enforced here. [`Resources`] keeps its fields private
//! so no caller can push `hp` or `mp` outside `[0, max]`.

use crate::action::Skill;
use crate::effect::PassiveKind;
use crate::error::{BattleError, ErrorSeverity};
use crate::stats::BaseStats;

use super::{InstanceId, StatusEffectKind, StatusEffects};

/// Which participant controls a combatant, relative to the local participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Side {
    /// Driven by local input.
    Own,
    /// On the local party, but driven by a delegated policy.
    Ally,
    /// Hostile: the remote peer or the computer opponent.
    Opponent,
}

/// Resource pool referenced by costs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "UPPERCASE")]
pub enum ResourcePool {
    Hp,
    Mp,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceError {
    #[error("not enough {pool}: {required} required, {available} available")]
    InsufficientResource {
        pool: ResourcePool,
        required: u32,
        available: u32,
    },
}

impl BattleError for ResourceError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            ResourceError::InsufficientResource { .. } => "RESOURCE_INSUFFICIENT",
        }
    }
}

/// Current and maximum HP/MP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "ResourcesRepr"))]
pub struct Resources {
    hp: u32,
    max_hp: u32,
    mp: u32,
    max_mp: u32,
}

/// Wire shape of [`Resources`]; clamped on the way in.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct ResourcesRepr {
    hp: u32,
    max_hp: u32,
    mp: u32,
    max_mp: u32,
}

#[cfg(feature = "serde")]
impl From<ResourcesRepr> for Resources {
    fn from(repr: ResourcesRepr) -> Self {
        Self::with_current(repr.hp, repr.max_hp, repr.mp, repr.max_mp)
    }
}

impl Resources {
    /// Full pools.
    pub const fn full(max_hp: u32, max_mp: u32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            mp: max_mp,
            max_mp,
        }
    }

    /// Explicit current values, clamped to their maximums.
    pub fn with_current(hp: u32, max_hp: u32, mp: u32, max_mp: u32) -> Self {
        Self {
            hp: hp.min(max_hp),
            max_hp,
            mp: mp.min(max_mp),
            max_mp,
        }
    }

    pub const fn hp(&self) -> u32 {
        self.hp
    }

    pub const fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub const fn mp(&self) -> u32 {
        self.mp
    }

    pub const fn max_mp(&self) -> u32 {
        self.max_mp
    }

    pub const fn current(&self, pool: ResourcePool) -> u32 {
        match pool {
            ResourcePool::Hp => self.hp,
            ResourcePool::Mp => self.mp,
        }
    }
}

/// Round markers that make passive triggers idempotent per round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PassiveMarks {
    pub round_start: Option<u32>,
    pub round_end: Option<u32>,
}

/// One character's live battle state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    /// Archetype identity shared by every instance of the same template.
    pub id: String,
    pub name: String,
    pub instance_id: InstanceId,
    pub side: Side,
    pub base_stats: BaseStats,
    resources: Resources,
    pub effects: StatusEffects,
    pub skills: Vec<Skill>,
    pub special: Option<Skill>,
    pub passive: Option<PassiveKind>,
    pub passive_marks: PassiveMarks,
}

impl Combatant {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        instance_id: InstanceId,
        side: Side,
        base_stats: BaseStats,
        resources: Resources,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            instance_id,
            side,
            base_stats,
            resources,
            effects: StatusEffects::empty(),
            skills: Vec::new(),
            special: None,
            passive: None,
            passive_marks: PassiveMarks::default(),
        }
    }

    pub fn with_skills(mut self, skills: Vec<Skill>) -> Self {
        self.skills = skills;
        self
    }

    pub fn with_special(mut self, special: Skill) -> Self {
        self.special = Some(special);
        self
    }

    pub fn with_passive(mut self, passive: PassiveKind) -> Self {
        self.passive = Some(passive);
        self
    }

    pub const fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Replaces HP/MP wholesale (snapshot application); values are clamped.
    pub fn set_resources(&mut self, resources: Resources) {
        self.resources = Resources::with_current(
            resources.hp,
            resources.max_hp,
            resources.mp,
            resources.max_mp,
        );
    }

    /// Removes up to `amount` HP and returns how much was actually removed.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.resources.hp);
        self.resources.hp -= applied;
        applied
    }

    /// Restores up to `amount` HP without exceeding the maximum.
    /// Returns the amount actually restored.
    pub fn apply_heal(&mut self, amount: u32) -> u32 {
        let missing = self.resources.max_hp - self.resources.hp;
        let applied = amount.min(missing);
        self.resources.hp += applied;
        applied
    }

    pub fn restore_mp(&mut self, amount: u32) -> u32 {
        let missing = self.resources.max_mp - self.resources.mp;
        let applied = amount.min(missing);
        self.resources.mp += applied;
        applied
    }

    /// Deducts `amount` from a pool, or fails without touching it.
    pub fn spend_resource(&mut self, pool: ResourcePool, amount: u32) -> Result<(), ResourceError> {
        let available = self.resources.current(pool);
        if amount > available {
            return Err(ResourceError::InsufficientResource {
                pool,
                required: amount,
                available,
            });
        }
        match pool {
            ResourcePool::Hp => self.resources.hp -= amount,
            ResourcePool::Mp => self.resources.mp -= amount,
        }
        Ok(())
    }

    pub const fn is_defeated(&self) -> bool {
        self.resources.hp == 0
    }

    pub const fn is_alive(&self) -> bool {
        !self.is_defeated()
    }

    /// Brings a defeated combatant back with `percent` of max HP (at least 1).
    /// Active effects are dropped. No-op on a living combatant.
    pub fn revive(&mut self, percent: u32) -> bool {
        if self.is_alive() || self.resources.max_hp == 0 {
            return false;
        }
        let hp = (self.resources.max_hp as u64 * percent as u64 / 100) as u32;
        self.resources.hp = hp.clamp(1, self.resources.max_hp);
        self.effects.clear();
        true
    }

    /// Marks defeat by clearing effects; the combatant stays in the roster.
    pub fn on_defeated(&mut self) {
        self.effects.clear();
    }

    pub fn has_effect(&self, kind: StatusEffectKind) -> bool {
        self.effects.has(kind)
    }

    /// Finds a skill or special by name.
    pub fn find_skill(&self, name: &str) -> Option<&Skill> {
        self.skills
            .iter()
            .chain(self.special.iter())
            .find(|skill| skill.name == name)
    }

    pub fn find_special(&self, name: &str) -> Option<&Skill> {
        self.special.as_ref().filter(|skill| skill.name == name)
    }
}
