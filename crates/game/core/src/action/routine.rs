//! Skill effect routines and their registry.
//!
//! Each [`SkillRoutine`] maps to one [`SkillEffect`] implementation with the
//! same signature: a mutable [`EffectContext`] and the resolved targets.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::combat::{CombatEvent, Strike, resolve_attack};
use crate::config::BattleConfig;
use crate::effect::{self, PassiveRegistry};
use crate::env::CombatRng;
use crate::log::LogEntry;
use crate::state::{InstanceId, Parties, StatusEffect};
use crate::stats::EffectiveStats;

use super::ActionError;
use super::skill::{Skill, SkillRoutine, StatusSpec};
use super::targeting::TargetSet;

/// Everything a routine may read or change while resolving one action.
pub struct EffectContext<'a> {
    pub parties: &'a mut Parties,
    pub caster: InstanceId,
    pub config: &'a BattleConfig,
    pub passives: &'a PassiveRegistry,
    pub rng: &'a mut dyn CombatRng,
    pub events: &'a mut Vec<CombatEvent>,
    pub log: &'a mut Vec<LogEntry>,
}

impl EffectContext<'_> {
    fn name_of(&self, id: InstanceId) -> String {
        self.parties
            .get(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Resolves and applies one hit from the caster. Returns the HP removed,
    /// or `None` when the target was already down.
    pub fn strike(&mut self, target: InstanceId, strike: Strike) -> Result<Option<u32>, ActionError> {
        let attacker = self
            .parties
            .get(self.caster)
            .ok_or(ActionError::MissingParticipant(self.caster))?;
        let defender = self
            .parties
            .get(target)
            .ok_or(ActionError::MissingParticipant(target))?;
        if defender.is_defeated() {
            return Ok(None);
        }

        let result = resolve_attack(attacker, defender, strike, self.config, self.passives, self.rng);
        let attacker_name = attacker.name.clone();

        let Some(defender) = self.parties.get_mut(target) else {
            return Err(ActionError::MissingParticipant(target));
        };
        let applied = defender.apply_damage(result.damage);
        self.events.push(CombatEvent::Attacked {
            attacker: self.caster,
            target,
            damage: applied,
            critical: result.critical,
            dodged: result.dodged,
            blocked: result.blocked,
        });

        let line = if result.dodged {
            LogEntry::action(format!("{} dodges {attacker_name}'s attack", defender.name))
        } else if result.blocked {
            LogEntry::action(format!("{} is unharmed", defender.name))
        } else if result.critical {
            LogEntry::damage(format!(
                "Critical! {attacker_name} hits {} for {applied} damage",
                defender.name
            ))
        } else {
            LogEntry::damage(format!(
                "{attacker_name} hits {} for {applied} damage",
                defender.name
            ))
        };
        self.log.push(line);

        if applied > 0 && defender.is_defeated() {
            defender.on_defeated();
            self.events.push(CombatEvent::Defeated { target });
            self.log
                .push(LogEntry::system(format!("{} is defeated", defender.name)));
        }
        Ok(Some(applied))
    }

    /// Heals a living target, honouring `curse`.
    pub fn heal(&mut self, target: InstanceId, amount: u32) -> u32 {
        let Some(combatant) = self.parties.get_mut(target) else {
            return 0;
        };
        let healed = effect::receive_heal(combatant, amount, self.config);
        if healed > 0 {
            self.events.push(CombatEvent::Healed {
                target,
                amount: healed,
            });
            self.log.push(LogEntry::heal(format!(
                "{} recovers {healed} HP",
                combatant.name
            )));
        }
        healed
    }

    pub fn apply_status(&mut self, target: InstanceId, spec: StatusSpec) {
        let Some(combatant) = self.parties.get_mut(target) else {
            return;
        };
        let effect = StatusEffect::new(spec.kind, spec.duration, spec.magnitude).with_source(self.caster);
        effect::apply_status(combatant, effect, self.events, self.log);
    }

    /// `hits` rounds of strikes. Group targets are re-expanded every hit.
    pub fn strike_each(
        &mut self,
        targets: TargetSet,
        strike: Strike,
        hits: u32,
    ) -> Result<u32, ActionError> {
        let mut total = 0;
        for _ in 0..hits.max(1) {
            for target in targets.expand(self.parties, self.caster) {
                total += self.strike(target, strike)?.unwrap_or(0);
            }
        }
        Ok(total)
    }

    fn caster_stats(&self) -> Result<EffectiveStats, ActionError> {
        let caster = self
            .parties
            .get(self.caster)
            .ok_or(ActionError::MissingParticipant(self.caster))?;
        Ok(EffectiveStats::compute(caster, self.passives))
    }
}

fn strike_of(skill: &Skill) -> Strike {
    Strike {
        damage_type: skill.damage_type,
        power: skill.power,
    }
}

/// Behaviour behind one [`SkillRoutine`].
pub trait SkillEffect: Send + Sync {
    fn routine(&self) -> SkillRoutine;

    fn apply(
        &self,
        ctx: &mut EffectContext<'_>,
        skill: &Skill,
        targets: TargetSet,
    ) -> Result<(), ActionError>;
}

struct Damage;

impl SkillEffect for Damage {
    fn routine(&self) -> SkillRoutine {
        SkillRoutine::Damage
    }

    fn apply(&self, ctx: &mut EffectContext<'_>, skill: &Skill, targets: TargetSet) -> Result<(), ActionError> {
        ctx.strike_each(targets, strike_of(skill), skill.hits)?;
        Ok(())
    }
}

struct DamageWithStatus;

impl SkillEffect for DamageWithStatus {
    fn routine(&self) -> SkillRoutine {
        SkillRoutine::DamageWithStatus
    }

    fn apply(&self, ctx: &mut EffectContext<'_>, skill: &Skill, targets: TargetSet) -> Result<(), ActionError> {
        ctx.strike_each(targets, strike_of(skill), skill.hits)?;
        if let Some(spec) = skill.status {
            for target in targets.expand(ctx.parties, ctx.caster) {
                ctx.apply_status(target, spec);
            }
        }
        Ok(())
    }
}

struct Heal;

impl SkillEffect for Heal {
    fn routine(&self) -> SkillRoutine {
        SkillRoutine::Heal
    }

    fn apply(&self, ctx: &mut EffectContext<'_>, skill: &Skill, targets: TargetSet) -> Result<(), ActionError> {
        let support = ctx.caster_stats()?.support.max(0) as u64;
        let amount = (support * skill.power as u64 / 100).max(1) as u32;
        for target in targets.expand(ctx.parties, ctx.caster) {
            ctx.heal(target, amount);
        }
        Ok(())
    }
}

struct ApplyStatus;

impl SkillEffect for ApplyStatus {
    fn routine(&self) -> SkillRoutine {
        SkillRoutine::ApplyStatus
    }

    fn apply(&self, ctx: &mut EffectContext<'_>, skill: &Skill, targets: TargetSet) -> Result<(), ActionError> {
        let Some(spec) = skill.status else {
            return Ok(());
        };
        for target in targets.expand(ctx.parties, ctx.caster) {
            ctx.apply_status(target, spec);
        }
        Ok(())
    }
}

struct Drain;

impl SkillEffect for Drain {
    fn routine(&self) -> SkillRoutine {
        SkillRoutine::Drain
    }

    fn apply(&self, ctx: &mut EffectContext<'_>, skill: &Skill, targets: TargetSet) -> Result<(), ActionError> {
        let dealt = ctx.strike_each(targets, strike_of(skill), skill.hits)?;
        let amount = (dealt as u64 * ctx.config.drain_ratio_pct as u64 / 100) as u32;
        if amount > 0 {
            ctx.heal(ctx.caster, amount);
        }
        Ok(())
    }
}

struct Revive;

impl SkillEffect for Revive {
    fn routine(&self) -> SkillRoutine {
        SkillRoutine::Revive
    }

    fn apply(&self, ctx: &mut EffectContext<'_>, skill: &Skill, targets: TargetSet) -> Result<(), ActionError> {
        let TargetSet::Single(target) = targets else {
            return Err(ActionError::invalid_target("revive needs a single target"));
        };
        let combatant = ctx
            .parties
            .get_mut(target)
            .ok_or(ActionError::MissingParticipant(target))?;
        if combatant.revive(skill.power.clamp(1, 100)) {
            let hp = combatant.resources().hp();
            ctx.events.push(CombatEvent::Revived { target, hp });
            ctx.log.push(LogEntry::heal(format!(
                "{} is revived with {hp} HP",
                combatant.name
            )));
        }
        Ok(())
    }
}

struct Cleanse;

impl SkillEffect for Cleanse {
    fn routine(&self) -> SkillRoutine {
        SkillRoutine::Cleanse
    }

    fn apply(&self, ctx: &mut EffectContext<'_>, _skill: &Skill, targets: TargetSet) -> Result<(), ActionError> {
        for target in targets.expand(ctx.parties, ctx.caster) {
            let Some(combatant) = ctx.parties.get_mut(target) else {
                continue;
            };
            let removed = combatant.effects.remove_debuffs();
            if removed.is_empty() {
                continue;
            }
            ctx.log
                .push(LogEntry::status(format!("{} is cleansed", combatant.name)));
            for kind in removed {
                ctx.events.push(CombatEvent::StatusRemoved { target, kind });
            }
        }
        Ok(())
    }
}

struct SelfDestruct;

impl SkillEffect for SelfDestruct {
    fn routine(&self) -> SkillRoutine {
        SkillRoutine::SelfDestruct
    }

    fn apply(&self, ctx: &mut EffectContext<'_>, skill: &Skill, targets: TargetSet) -> Result<(), ActionError> {
        ctx.strike_each(targets, strike_of(skill), skill.hits)?;

        let caster_name = ctx.name_of(ctx.caster);
        let caster = ctx
            .parties
            .get_mut(ctx.caster)
            .ok_or(ActionError::MissingParticipant(ctx.caster))?;
        let lost = caster.apply_damage(u32::MAX);
        if lost > 0 {
            caster.on_defeated();
            ctx.events.push(CombatEvent::Damaged {
                target: ctx.caster,
                amount: lost,
            });
            ctx.events.push(CombatEvent::Defeated { target: ctx.caster });
            ctx.log
                .push(LogEntry::system(format!("{caster_name} is consumed by the blast")));
        }
        Ok(())
    }
}

/// Lookup table from routine key to behaviour.
#[derive(Clone, Default)]
pub struct SkillRegistry {
    table: BTreeMap<SkillRoutine, Arc<dyn SkillEffect>>,
}

impl SkillRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every built-in routine.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(Damage));
        registry.register(Arc::new(DamageWithStatus));
        registry.register(Arc::new(Heal));
        registry.register(Arc::new(ApplyStatus));
        registry.register(Arc::new(Drain));
        registry.register(Arc::new(Revive));
        registry.register(Arc::new(Cleanse));
        registry.register(Arc::new(SelfDestruct));
        registry
    }

    pub fn register(&mut self, effect: Arc<dyn SkillEffect>) {
        self.table.insert(effect.routine(), effect);
    }

    pub fn get(&self, routine: SkillRoutine) -> Option<&dyn SkillEffect> {
        self.table.get(&routine).map(|e| e.as_ref())
    }
}

impl core::fmt::Debug for SkillRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.table.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn standard_registry_covers_every_routine() {
        let registry = SkillRegistry::standard();
        for routine in SkillRoutine::iter() {
            assert_eq!(registry.get(routine).unwrap().routine(), routine);
        }
        assert!(SkillRegistry::empty().get(SkillRoutine::Heal).is_none());
    }
}
