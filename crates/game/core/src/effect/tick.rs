//! Round-boundary processing.

use crate::combat::CombatEvent;
use crate::config::BattleConfig;
use crate::log::LogEntry;
use crate::state::{InstanceId, Parties, StatusEffectKind};

use super::passive::{PassiveContext, PassiveRegistry};
use super::receive_heal;

/// Which passive hook to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Trigger {
    RoundStart,
    RoundEnd,
}

/// Runs round-start passives for every living combatant, once per round.
pub fn run_round_start(
    parties: &mut Parties,
    round: u32,
    config: &BattleConfig,
    passives: &PassiveRegistry,
    events: &mut Vec<CombatEvent>,
    log: &mut Vec<LogEntry>,
) {
    run_passives(Trigger::RoundStart, parties, round, config, passives, events, log);
}

/// Round-end ticks, then round-end passives.
///
/// For each living combatant, in roster order:
/// 1. damage over time (`poison`, `burn`, `bleed` × stacks), unless invulnerable
/// 2. `regen` healing
/// 3. durations tick down; expired effects are removed
/// 4. `defending` is cleared
pub fn run_round_end(
    parties: &mut Parties,
    round: u32,
    config: &BattleConfig,
    passives: &PassiveRegistry,
    events: &mut Vec<CombatEvent>,
    log: &mut Vec<LogEntry>,
) {
    for combatant in parties.all_mut() {
        if combatant.is_defeated() {
            continue;
        }
        let id = combatant.instance_id;

        let dot: u32 = combatant
            .effects
            .iter()
            .filter(|e| e.kind.is_damage_over_time())
            .map(|e| (e.magnitude.max(0) as u32).saturating_mul(e.stacks))
            .fold(0u32, u32::saturating_add);
        if dot > 0 {
            if combatant.has_effect(StatusEffectKind::Invulnerable) {
                log.push(LogEntry::status(format!(
                    "{} shrugs off damage over time",
                    combatant.name
                )));
            } else {
                let applied = combatant.apply_damage(dot);
                events.push(CombatEvent::Damaged {
                    target: id,
                    amount: applied,
                });
                log.push(LogEntry::damage(format!(
                    "{} takes {applied} damage over time",
                    combatant.name
                )));
                if combatant.is_defeated() {
                    combatant.on_defeated();
                    events.push(CombatEvent::Defeated { target: id });
                    log.push(LogEntry::system(format!("{} is defeated", combatant.name)));
                    continue;
                }
            }
        }

        if let Some(regen) = combatant.effects.get(StatusEffectKind::Regen) {
            let amount = regen.magnitude.max(0) as u32;
            let healed = receive_heal(combatant, amount, config);
            if healed > 0 {
                events.push(CombatEvent::Healed {
                    target: id,
                    amount: healed,
                });
                log.push(LogEntry::heal(format!(
                    "{} regenerates {healed} HP",
                    combatant.name
                )));
            }
        }

        for kind in combatant.effects.tick_durations() {
            events.push(CombatEvent::StatusRemoved { target: id, kind });
            log.push(LogEntry::status(format!(
                "{} is no longer affected by {}",
                combatant.name,
                kind.label()
            )));
        }

        if combatant.effects.remove(StatusEffectKind::Defending).is_some() {
            events.push(CombatEvent::StatusRemoved {
                target: id,
                kind: StatusEffectKind::Defending,
            });
        }
    }

    run_passives(Trigger::RoundEnd, parties, round, config, passives, events, log);
}

fn run_passives(
    trigger: Trigger,
    parties: &mut Parties,
    round: u32,
    config: &BattleConfig,
    passives: &PassiveRegistry,
    events: &mut Vec<CombatEvent>,
    log: &mut Vec<LogEntry>,
) {
    let owners: Vec<InstanceId> = parties.living().map(|c| c.instance_id).collect();
    for owner in owners {
        let Some(combatant) = parties.get_mut(owner) else {
            continue;
        };
        // an earlier passive in this loop may have changed hp
        if combatant.is_defeated() {
            continue;
        }
        let Some(passive) = combatant.passive.and_then(|kind| passives.get(kind)) else {
            continue;
        };
        let mark = match trigger {
            Trigger::RoundStart => &mut combatant.passive_marks.round_start,
            Trigger::RoundEnd => &mut combatant.passive_marks.round_end,
        };
        if *mark == Some(round) {
            continue;
        }
        *mark = Some(round);

        let mut ctx = PassiveContext {
            owner,
            parties: &mut *parties,
            round,
            config,
            events: &mut *events,
            log: &mut *log,
        };
        match trigger {
            Trigger::RoundStart => passive.on_round_start(&mut ctx),
            Trigger::RoundEnd => passive.on_round_end(&mut ctx),
        }
    }
}
