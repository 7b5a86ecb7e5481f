//! Status effect system for combatants.
//!
//! Status effects are temporary conditions that modify stats, deal or heal
//! damage over time, or restrict actions.
//!
//! # Round-based Duration
//!
//! Effects store `remaining` rounds, decremented once per full round at the
//! round-end tick. An effect whose `remaining` drops to 0 or below is removed
//! during that same tick, before the next round computes its turn order.
//! Two kinds ignore the countdown: `stun` is consumed when it skips an
//! action, and `defending` is cleared at every round end.

use arrayvec::ArrayVec;

use crate::config::BattleConfig;
use crate::stats::StatKind;

use super::InstanceId;

/// Types of status effects. At most one entry per kind lives on a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatusEffectKind {
    // ========================================================================
    // Stat modifiers (magnitude = factor in percent)
    // ========================================================================
    Buff(StatKind),
    Debuff(StatKind),

    // ========================================================================
    // Crowd control
    // ========================================================================
    /// Skips the next action, then is consumed.
    Stun,
    /// Forces single-target hostile actions onto this combatant.
    Taunt,
    /// Cannot use skills or specials.
    Void,

    // ========================================================================
    // Over time (magnitude = flat amount per round)
    // ========================================================================
    Poison,
    Burn,
    /// Stacking damage over time: magnitude × stacks per round.
    Bleed,
    Regen,

    // ========================================================================
    // Special states
    // ========================================================================
    /// Healing received is reduced.
    Curse,
    /// Incoming damage is nullified.
    Invulnerable,
    /// Incoming damage is halved until round end.
    Defending,
    /// Stacking attack boost: +magnitude% per stack.
    Rage,
}

impl StatusEffectKind {
    /// Kinds whose re-application adds a stack instead of only refreshing.
    pub const fn is_stacking(self) -> bool {
        matches!(self, StatusEffectKind::Bleed | StatusEffectKind::Rage)
    }

    /// Harmful kinds, removed by cleanse routines.
    pub const fn is_debuff(self) -> bool {
        matches!(
            self,
            StatusEffectKind::Debuff(_)
                | StatusEffectKind::Stun
                | StatusEffectKind::Void
                | StatusEffectKind::Poison
                | StatusEffectKind::Burn
                | StatusEffectKind::Bleed
                | StatusEffectKind::Curse
        )
    }

    /// Kinds that deal damage at the round-end tick.
    pub const fn is_damage_over_time(self) -> bool {
        matches!(
            self,
            StatusEffectKind::Poison | StatusEffectKind::Burn | StatusEffectKind::Bleed
        )
    }

    /// Kinds exempt from the per-round countdown.
    pub const fn ignores_countdown(self) -> bool {
        matches!(self, StatusEffectKind::Stun | StatusEffectKind::Defending)
    }

    /// The more potent of two magnitudes for this kind. Debuff factors
    /// weaken as they approach 100, everything else grows with magnitude.
    pub fn stronger(self, a: i32, b: i32) -> i32 {
        match self {
            StatusEffectKind::Debuff(_) => a.min(b),
            _ => a.max(b),
        }
    }

    pub fn label(self) -> String {
        match self {
            StatusEffectKind::Buff(stat) => format!("{stat} up"),
            StatusEffectKind::Debuff(stat) => format!("{stat} down"),
            StatusEffectKind::Stun => "stun".into(),
            StatusEffectKind::Taunt => "taunt".into(),
            StatusEffectKind::Void => "void".into(),
            StatusEffectKind::Poison => "poison".into(),
            StatusEffectKind::Burn => "burn".into(),
            StatusEffectKind::Bleed => "bleed".into(),
            StatusEffectKind::Regen => "regen".into(),
            StatusEffectKind::Curse => "curse".into(),
            StatusEffectKind::Invulnerable => "invulnerable".into(),
            StatusEffectKind::Defending => "defending".into(),
            StatusEffectKind::Rage => "rage".into(),
        }
    }
}

/// A single status effect instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub kind: StatusEffectKind,
    /// Rounds left before expiry.
    pub remaining: i32,
    /// Factor in percent for stat modifiers, flat amount for over-time kinds.
    pub magnitude: i32,
    /// Stack count; always 1 for non-stacking kinds.
    pub stacks: u32,
    /// Caster that applied the effect (lookup only).
    pub source: Option<InstanceId>,
}

impl StatusEffect {
    pub const MAX_STACKS: u32 = 5;

    pub fn new(kind: StatusEffectKind, remaining: i32, magnitude: i32) -> Self {
        Self {
            kind,
            remaining,
            magnitude,
            stacks: 1,
            source: None,
        }
    }

    pub fn with_source(mut self, source: InstanceId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0
    }
}

/// What happened when an effect was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// A new entry was created.
    Added,
    /// An existing entry had its duration refreshed (and maybe a stack added).
    Refreshed { stacks: u32 },
    /// Not applied: zero duration or no free slot.
    Rejected,
}

/// Active status effects on a combatant, unique per kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, { BattleConfig::MAX_STATUS_EFFECTS }>,
}

impl StatusEffects {
    /// Creates an empty status effect set.
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    /// Checks if a specific status effect is active.
    pub fn has(&self, kind: StatusEffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn get(&self, kind: StatusEffectKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    /// Adds a status effect, or refreshes the existing entry of the same kind.
    ///
    /// A refresh never weakens the entry: it keeps the longer duration and
    /// the stronger magnitude. Stacking kinds also gain a stack (capped at
    /// [`StatusEffect::MAX_STACKS`]).
    pub fn apply(&mut self, effect: StatusEffect) -> Applied {
        if effect.is_expired() {
            return Applied::Rejected;
        }

        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            existing.remaining = existing.remaining.max(effect.remaining);
            existing.magnitude = effect.kind.stronger(existing.magnitude, effect.magnitude);
            existing.source = effect.source;
            if effect.kind.is_stacking() {
                existing.stacks = (existing.stacks + 1).min(StatusEffect::MAX_STACKS);
            }
            return Applied::Refreshed {
                stacks: existing.stacks,
            };
        }

        if self.effects.is_full() {
            return Applied::Rejected;
        }
        self.effects.push(StatusEffect { stacks: 1, ..effect });
        Applied::Added
    }

    /// Removes a status effect immediately, returning it if it was present.
    pub fn remove(&mut self, kind: StatusEffectKind) -> Option<StatusEffect> {
        let index = self.effects.iter().position(|e| e.kind == kind)?;
        Some(self.effects.remove(index))
    }

    /// Removes every harmful effect, returning the removed kinds.
    pub fn remove_debuffs(&mut self) -> Vec<StatusEffectKind> {
        let removed: Vec<_> = self
            .effects
            .iter()
            .filter(|e| e.kind.is_debuff())
            .map(|e| e.kind)
            .collect();
        self.effects.retain(|e| !e.kind.is_debuff());
        removed
    }

    /// Decrements every counting effect by one round and drops the expired
    /// ones, returning their kinds.
    pub fn tick_durations(&mut self) -> Vec<StatusEffectKind> {
        for effect in self.effects.iter_mut() {
            if !effect.kind.ignores_countdown() {
                effect.remaining -= 1;
            }
        }
        let expired: Vec<_> = self
            .effects
            .iter()
            .filter(|e| e.is_expired())
            .map(|e| e.kind)
            .collect();
        self.effects.retain(|e| !e.is_expired());
        expired
    }

    /// Returns an iterator over all effects.
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}
