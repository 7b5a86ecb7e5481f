//! Single-action execution.
//!
//! [`resolve_action`] runs one [`ActionIntent`] against a working copy of the
//! rosters and only writes it back when every step succeeded, so a rejected
//! action never leaves partial damage or a spent cost behind.

use crate::combat::{CombatEvent, Strike};
use crate::env::{CombatRng, Rulebook};
use crate::log::LogEntry;
use crate::state::{Applied, Combatant, Parties, ResourcePool, StatusEffect, StatusEffectKind};

use super::intent::{ActionIntent, ActionKind};
use super::routine::EffectContext;
use super::skill::{Skill, TargetScope};
use super::targeting::{TargetSet, Targeting, resolve_targets};
use super::ActionError;

/// Magnitude recorded on a `defending` effect: incoming damage is halved.
pub const DEFEND_MAGNITUDE: i32 = 50;

/// What a resolved action did.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionReport {
    pub intent: ActionIntent,
    pub events: Vec<CombatEvent>,
    pub log: Vec<LogEntry>,
}

/// Resolves `intent` and commits the result into `parties`.
///
/// On error `parties` is untouched.
pub fn resolve_action(
    parties: &mut Parties,
    intent: &ActionIntent,
    rules: &Rulebook,
    rng: &mut dyn CombatRng,
) -> Result<ActionReport, ActionError> {
    intent.validate_shape()?;

    let actor = parties
        .get(intent.actor)
        .ok_or(ActionError::MissingParticipant(intent.actor))?;
    if let Some(target) = intent.target {
        if parties.get(target).is_none() {
            return Err(ActionError::MissingParticipant(target));
        }
    }

    let mut working = parties.clone();
    let mut events = Vec::new();
    let mut log = Vec::new();

    match intent.kind {
        ActionKind::Attack => {
            let targeting = resolve_targets(parties, actor, TargetScope::SingleEnemy, intent.target)?;
            log.push(LogEntry::action(format!("{} attacks", actor.name)));
            note_redirect(parties, &targeting, &mut events, &mut log);

            let mut ctx = EffectContext {
                parties: &mut working,
                caster: intent.actor,
                config: &rules.config,
                passives: &rules.passives,
                rng,
                events: &mut events,
                log: &mut log,
            };
            ctx.strike_each(targeting.set, Strike::basic(), 1)?;
        }
        ActionKind::Defend => {
            let effect = StatusEffect::new(
                StatusEffectKind::Defending,
                rules.config.defend_duration,
                DEFEND_MAGNITUDE,
            );
            let combatant = working
                .get_mut(intent.actor)
                .ok_or(ActionError::MissingParticipant(intent.actor))?;
            match combatant.effects.apply(effect) {
                Applied::Added | Applied::Refreshed { .. } => {
                    events.push(CombatEvent::Defended { actor: intent.actor });
                    log.push(LogEntry::action(format!("{} takes a defensive stance", combatant.name)));
                }
                // no free effect slot: the turn is spent without a stance
                Applied::Rejected => {
                    log.push(LogEntry::system(format!(
                        "{} cannot take a defensive stance",
                        combatant.name
                    )));
                }
            }
        }
        ActionKind::Skill | ActionKind::Special => {
            let name = intent.skill_name.as_deref().unwrap_or_default();
            let skill = lookup_skill(intent, name, actor)?;

            if actor.has_effect(StatusEffectKind::Void) {
                return Err(ActionError::Silenced {
                    actor: intent.actor,
                    name: name.to_string(),
                });
            }

            let targeting = resolve_targets(parties, actor, skill.scope, intent.target)?;
            let routine = rules.skills.get(skill.routine).ok_or_else(|| ActionError::UnknownSkill {
                actor: intent.actor,
                name: name.to_string(),
            })?;

            let caster = working
                .get_mut(intent.actor)
                .ok_or(ActionError::MissingParticipant(intent.actor))?;
            if skill.mp_cost > 0 {
                caster
                    .spend_resource(ResourcePool::Mp, skill.mp_cost)
                    .map_err(|e| ActionError::from_resource(intent.actor, e))?;
                events.push(CombatEvent::ResourceSpent {
                    actor: intent.actor,
                    pool: ResourcePool::Mp,
                    amount: skill.mp_cost,
                });
            }
            log.push(LogEntry::action(format!("{} uses {}", actor.name, skill.name)));
            note_redirect(parties, &targeting, &mut events, &mut log);

            let mut ctx = EffectContext {
                parties: &mut working,
                caster: intent.actor,
                config: &rules.config,
                passives: &rules.passives,
                rng,
                events: &mut events,
                log: &mut log,
            };
            routine.apply(&mut ctx, skill, targeting.set)?;
        }
    }

    *parties = working;
    Ok(ActionReport {
        intent: intent.clone(),
        events,
        log,
    })
}

fn lookup_skill<'c>(
    intent: &ActionIntent,
    name: &str,
    actor: &'c Combatant,
) -> Result<&'c Skill, ActionError> {
    let found = match intent.kind {
        ActionKind::Special => actor.find_special(name),
        _ => actor.skills.iter().find(|skill| skill.name == name),
    };
    found.ok_or_else(|| ActionError::UnknownSkill {
        actor: intent.actor,
        name: name.to_string(),
    })
}

fn note_redirect(
    parties: &Parties,
    targeting: &Targeting,
    events: &mut Vec<CombatEvent>,
    log: &mut Vec<LogEntry>,
) {
    let (Some(from), TargetSet::Single(to)) = (targeting.redirected_from, targeting.set)
    else {
        return;
    };
    events.push(CombatEvent::Redirected { from, to });
    if let Some(taunter) = parties.get(to) {
        log.push(LogEntry::status(format!("{} draws the attack", taunter.name)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::SkillRoutine;
    use crate::env::SequenceRng;
    use crate::state::fixtures::fighter;
    use crate::state::{InstanceId, PartyOrigin};
    use crate::stats::{BaseStats, StatKind};

    fn parties() -> Parties {
        let mage = fighter(
            PartyOrigin::Host,
            0,
            BaseStats::default().with(StatKind::Atk, 70).with(StatKind::Matk, 60),
            100,
            20,
        )
        .with_skills(vec![
            Skill::new("meteor", SkillRoutine::Damage, TargetScope::AllEnemies)
                .cost(25)
                .magical(),
            Skill::new("spark", SkillRoutine::Damage, TargetScope::SingleEnemy)
                .cost(5)
                .magical(),
            Skill::new("mend", SkillRoutine::Heal, TargetScope::SingleAlly).cost(5),
        ])
        .with_special(Skill::new("nova", SkillRoutine::SelfDestruct, TargetScope::AllEnemies));
        let ally = fighter(PartyOrigin::Host, 1, BaseStats::default(), 100, 0);
        let foes = (0..2)
            .map(|slot| {
                fighter(
                    PartyOrigin::Guest,
                    slot,
                    BaseStats::default().with(StatKind::Def, 20).with(StatKind::Mdef, 10),
                    60,
                    0,
                )
            })
            .collect();
        Parties {
            host: vec![mage, ally],
            guest: foes,
        }
    }

    fn quiet_rng() -> SequenceRng {
        // d100 of 100: no dodge, no crit
        SequenceRng::constant(99)
    }

    #[test]
    fn attack_applies_formula_damage() {
        let mut p = parties();
        let intent = ActionIntent::attack(InstanceId::host(0), InstanceId::guest(0));
        let report = resolve_action(&mut p, &intent, &Rulebook::default(), &mut quiet_rng()).unwrap();
        assert_eq!(p.get(InstanceId::guest(0)).unwrap().resources().hp(), 10);
        assert!(matches!(
            report.events[0],
            CombatEvent::Attacked { damage: 50, .. }
        ));
    }

    #[test]
    fn insufficient_mp_rejects_without_mutation() {
        let mut p = parties();
        let before = p.clone();
        let intent = ActionIntent::skill(InstanceId::host(0), "meteor", None);
        let err = resolve_action(&mut p, &intent, &Rulebook::default(), &mut quiet_rng()).unwrap_err();
        assert!(matches!(
            err,
            ActionError::InsufficientResource {
                required: 25,
                available: 20,
                ..
            }
        ));
        assert_eq!(p, before);
    }

    #[test]
    fn unknown_skill_is_a_no_op() {
        let mut p = parties();
        let before = p.clone();
        let intent = ActionIntent::skill(InstanceId::host(0), "teleport", None);
        let err = resolve_action(&mut p, &intent, &Rulebook::default(), &mut quiet_rng()).unwrap_err();
        assert!(matches!(err, ActionError::UnknownSkill { .. }));
        assert_eq!(p, before);
    }

    #[test]
    fn missing_target_aborts() {
        let mut p = parties();
        let before = p.clone();
        let intent = ActionIntent::attack(InstanceId::host(0), InstanceId::guest(5));
        assert_eq!(
            resolve_action(&mut p, &intent, &Rulebook::default(), &mut quiet_rng()),
            Err(ActionError::MissingParticipant(InstanceId::guest(5)))
        );
        let intent = ActionIntent::defend(InstanceId::guest(9));
        assert!(resolve_action(&mut p, &intent, &Rulebook::default(), &mut quiet_rng()).is_err());
        assert_eq!(p, before);
    }

    #[test]
    fn skill_spends_mp_then_runs() {
        let mut p = parties();
        let intent = ActionIntent::skill(InstanceId::host(0), "spark", Some(InstanceId::guest(1)));
        resolve_action(&mut p, &intent, &Rulebook::default(), &mut quiet_rng()).unwrap();
        assert_eq!(p.get(InstanceId::host(0)).unwrap().resources().mp(), 15);
        // 60 matk − 10 mdef
        assert_eq!(p.get(InstanceId::guest(1)).unwrap().resources().hp(), 10);
    }

    #[test]
    fn void_blocks_skills() {
        let mut p = parties();
        p.get_mut(InstanceId::host(0))
            .unwrap()
            .effects
            .apply(StatusEffect::new(StatusEffectKind::Void, 2, 0));
        let intent = ActionIntent::skill(InstanceId::host(0), "spark", Some(InstanceId::guest(1)));
        assert!(matches!(
            resolve_action(&mut p, &intent, &Rulebook::default(), &mut quiet_rng()),
            Err(ActionError::Silenced { .. })
        ));
    }

    #[test]
    fn defend_sets_a_one_round_stance() {
        let mut p = parties();
        let intent = ActionIntent::defend(InstanceId::host(1));
        resolve_action(&mut p, &intent, &Rulebook::default(), &mut quiet_rng()).unwrap();
        let stance = p
            .get(InstanceId::host(1))
            .unwrap()
            .effects
            .get(StatusEffectKind::Defending)
            .copied()
            .unwrap();
        assert_eq!(stance.remaining, 1);
    }

    #[test]
    fn defend_without_a_free_slot_reports_no_stance() {
        let mut p = parties();
        let guard = p.get_mut(InstanceId::host(1)).unwrap();
        let stats = [
            StatKind::Atk,
            StatKind::Matk,
            StatKind::Def,
            StatKind::Mdef,
            StatKind::Spd,
            StatKind::Support,
            StatKind::CritRate,
            StatKind::DodgeRate,
        ];
        for stat in stats {
            guard.effects.apply(StatusEffect::new(StatusEffectKind::Buff(stat), 2, 110));
            guard.effects.apply(StatusEffect::new(StatusEffectKind::Debuff(stat), 2, 90));
        }

        let intent = ActionIntent::defend(InstanceId::host(1));
        let report = resolve_action(&mut p, &intent, &Rulebook::default(), &mut quiet_rng()).unwrap();
        assert!(!p.get(InstanceId::host(1)).unwrap().has_effect(StatusEffectKind::Defending));
        assert!(!report.events.iter().any(|e| matches!(e, CombatEvent::Defended { .. })));
        assert!(report.log.iter().any(|entry| entry.text.contains("cannot take a defensive stance")));
    }

    #[test]
    fn self_destruct_can_empty_both_sides() {
        let mut p = parties();
        p.host.truncate(1);
        for foe in p.guest.iter_mut() {
            foe.apply_damage(55);
        }
        let intent = ActionIntent::special(InstanceId::host(0), "nova", None);
        resolve_action(&mut p, &intent, &Rulebook::default(), &mut quiet_rng()).unwrap();
        assert!(p.living().next().is_none());
    }

    #[test]
    fn heal_targets_allies_only() {
        let mut p = parties();
        let intent = ActionIntent::skill(InstanceId::host(0), "mend", Some(InstanceId::guest(0)));
        assert!(matches!(
            resolve_action(&mut p, &intent, &Rulebook::default(), &mut quiet_rng()),
            Err(ActionError::InvalidTarget { .. })
        ));
    }
}
