//! Attack resolution.

use crate::config::BattleConfig;
use crate::effect::PassiveRegistry;
use crate::env::CombatRng;
use crate::state::{Combatant, StatusEffectKind};
use crate::stats::EffectiveStats;

use super::damage::{DamageType, base_damage, scale};

/// Outcome of one hit, before it is applied to the defender.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackResult {
    pub damage: u32,
    pub critical: bool,
    pub dodged: bool,
    pub defended: bool,
    /// Nullified by `invulnerable`.
    pub blocked: bool,
}

/// Inputs of one hit.
#[derive(Clone, Copy, Debug)]
pub struct Strike {
    pub damage_type: DamageType,
    /// Percent of the attack stat.
    pub power: u32,
}

impl Strike {
    pub const fn basic() -> Self {
        Self {
            damage_type: DamageType::Physical,
            power: super::damage::BASIC_POWER,
        }
    }
}

/// Resolves one hit of `attacker` against `defender`.
///
/// # Pipeline
///
/// ```text
/// base = max(1, atk × power/100 − def)      (matk/mdef when magical)
///   → defending target: base / 2
///   → dodge roll: zero damage, stop
///   → crit roll: × crit_multiplier, then critical passives
///   → outgoing passives
///   → variance (only when configured)
///   → invulnerable target: zero damage
/// ```
///
/// The dodge roll always draws; the crit roll draws unless the hit was dodged.
pub fn resolve_attack(
    attacker: &Combatant,
    defender: &Combatant,
    strike: Strike,
    config: &BattleConfig,
    passives: &PassiveRegistry,
    rng: &mut dyn CombatRng,
) -> AttackResult {
    let atk_stats = EffectiveStats::compute(attacker, passives);
    let def_stats = EffectiveStats::compute(defender, passives);
    let (attack, defense) = match strike.damage_type {
        DamageType::Physical => (atk_stats.atk, def_stats.def),
        DamageType::Magical => (atk_stats.matk, def_stats.mdef),
    };

    let mut result = AttackResult::default();
    let mut damage = base_damage(attack, defense, strike.power);

    if defender.has_effect(StatusEffectKind::Defending) {
        damage /= 2;
        result.defended = true;
    }

    if rng.chance(def_stats.dodge_rate as u32) {
        result.dodged = true;
        return result;
    }

    let passive = attacker.passive.and_then(|kind| passives.get(kind));

    if rng.chance(atk_stats.crit_rate as u32) {
        result.critical = true;
        damage = scale(damage, atk_stats.crit_multiplier as i64);
        if let Some(passive) = passive {
            damage = passive.modify_critical(damage);
        }
    }

    if let Some(passive) = passive {
        damage = passive.modify_outgoing(damage);
    }

    if config.damage_variance_pct > 0 {
        let pct = config.damage_variance_pct as i32;
        let roll = rng.range(-pct, pct);
        damage = scale(damage, 100 + roll as i64);
    }

    if defender.has_effect(StatusEffectKind::Invulnerable) {
        result.blocked = true;
        damage = 0;
    }

    result.damage = damage;
    result
}
