//! Effect engine: status application, passive abilities and round-boundary
//! ticks.
//!
//! Round order is fixed:
//!
//! ```text
//! round-start passives → turn order → actions → round-end ticks → round-end passives
//! ```

pub mod passive;
pub mod tick;

pub use passive::{Passive, PassiveContext, PassiveKind, PassiveRegistry};
pub use tick::{run_round_end, run_round_start};

use crate::combat::CombatEvent;
use crate::config::BattleConfig;
use crate::log::LogEntry;
use crate::state::{Applied, Combatant, StatusEffect, StatusEffectKind};

/// Heals `target`, reduced by `curse` when present. Returns the HP restored.
pub fn receive_heal(target: &mut Combatant, amount: u32, config: &BattleConfig) -> u32 {
    if target.is_defeated() {
        return 0;
    }
    let amount = if target.has_effect(StatusEffectKind::Curse) {
        (amount as u64 * config.curse_heal_pct as u64 / 100) as u32
    } else {
        amount
    };
    target.apply_heal(amount)
}

/// Applies a status effect to a living target and records what happened.
pub fn apply_status(
    target: &mut Combatant,
    effect: StatusEffect,
    events: &mut Vec<CombatEvent>,
    log: &mut Vec<LogEntry>,
) -> Applied {
    if target.is_defeated() {
        return Applied::Rejected;
    }
    let applied = target.effects.apply(effect);
    let stacks = match applied {
        Applied::Added => 1,
        Applied::Refreshed { stacks } => stacks,
        Applied::Rejected => return applied,
    };
    events.push(CombatEvent::StatusApplied {
        target: target.instance_id,
        kind: effect.kind,
        stacks,
    });
    let text = if effect.kind.is_stacking() && stacks > 1 {
        format!("{} is affected by {} (x{stacks})", target.name, effect.kind.label())
    } else {
        format!("{} is affected by {}", target.name, effect.kind.label())
    };
    log.push(LogEntry::status(text));
    applied
}
