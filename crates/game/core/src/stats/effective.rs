//! Effective stats: base stats with every active modifier folded in.
//!
//! Not stored - recomputed whenever an action, a tick or the scheduler needs
//! them, so an effect that expires stops counting immediately.

use strum::IntoEnumIterator;

use crate::effect::PassiveRegistry;
use crate::state::{Combatant, StatusEffectKind};

use super::bonus::{Bonus, BonusStack, StatBounds};
use super::base::StatKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectiveStats {
    pub atk: i32,
    pub matk: i32,
    pub def: i32,
    pub mdef: i32,
    pub spd: i32,
    pub support: i32,
    pub crit_rate: i32,
    pub crit_multiplier: i32,
    pub dodge_rate: i32,
}

impl EffectiveStats {
    /// Folds effect factors, then passive flat bonuses, then clamps.
    pub fn compute(combatant: &Combatant, passives: &PassiveRegistry) -> Self {
        let passive = combatant.passive.and_then(|kind| passives.get(kind));
        let value = |stat: StatKind| {
            let mut stack = factor_bonuses(combatant, stat);
            if let Some(passive) = passive {
                let flat = passive.stat_bonus(stat);
                if flat != 0 {
                    stack.add(Bonus::flat(flat));
                }
            }
            let bounds = bounds_for(stat);
            stack.apply(combatant.base_stats.get(stat), bounds.min, bounds.max)
        };

        Self {
            atk: value(StatKind::Atk),
            matk: value(StatKind::Matk),
            def: value(StatKind::Def),
            mdef: value(StatKind::Mdef),
            spd: value(StatKind::Spd),
            support: value(StatKind::Support),
            crit_rate: value(StatKind::CritRate),
            crit_multiplier: value(StatKind::CritMultiplier),
            dodge_rate: value(StatKind::DodgeRate),
        }
    }

    pub fn get(&self, stat: StatKind) -> i32 {
        match stat {
            StatKind::Atk => self.atk,
            StatKind::Matk => self.matk,
            StatKind::Def => self.def,
            StatKind::Mdef => self.mdef,
            StatKind::Spd => self.spd,
            StatKind::Support => self.support,
            StatKind::CritRate => self.crit_rate,
            StatKind::CritMultiplier => self.crit_multiplier,
            StatKind::DodgeRate => self.dodge_rate,
        }
    }

    /// Every stat as `(kind, value)`, for display.
    pub fn entries(&self) -> impl Iterator<Item = (StatKind, i32)> + '_ {
        StatKind::iter().map(move |stat| (stat, self.get(stat)))
    }
}

fn bounds_for(stat: StatKind) -> StatBounds {
    match stat {
        StatKind::CritMultiplier => StatBounds::MULTIPLIER,
        stat if stat.is_rate() => StatBounds::RATE,
        _ => StatBounds::COMBAT,
    }
}

/// Percentage factors contributed by status effects on one stat.
fn factor_bonuses(combatant: &Combatant, stat: StatKind) -> BonusStack {
    let mut stack = BonusStack::new();
    for effect in combatant.effects.iter() {
        match effect.kind {
            StatusEffectKind::Buff(target) | StatusEffectKind::Debuff(target) if target == stat => {
                stack.add(Bonus::factor(effect.magnitude));
            }
            StatusEffectKind::Rage if stat == StatKind::Atk => {
                let rage = effect.magnitude.saturating_mul(effect.stacks as i32);
                stack.add(Bonus::factor(100i32.saturating_add(rage)));
            }
            _ => {}
        }
    }
    stack
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::PassiveKind;
    use crate::state::fixtures::fighter;
    use crate::state::{PartyOrigin, StatusEffect};
    use crate::stats::BaseStats;

    fn base() -> BaseStats {
        BaseStats::default()
            .with(StatKind::Atk, 100)
            .with(StatKind::Def, 20)
            .with(StatKind::Spd, 40)
    }

    #[test]
    fn buff_and_debuff_on_same_stat_multiply() {
        let mut c = fighter(PartyOrigin::Host, 0, base(), 100, 0);
        c.effects
            .apply(StatusEffect::new(StatusEffectKind::Buff(StatKind::Atk), 2, 130));
        c.effects
            .apply(StatusEffect::new(StatusEffectKind::Debuff(StatKind::Atk), 2, 70));
        let stats = EffectiveStats::compute(&c, &PassiveRegistry::standard());
        assert_eq!(stats.atk, 91);
        assert_eq!(stats.def, 20);
    }

    #[test]
    fn passive_flat_bonus_applies_after_factors() {
        let mut c = fighter(PartyOrigin::Host, 0, base(), 100, 0).with_passive(PassiveKind::IronSkin);
        c.effects
            .apply(StatusEffect::new(StatusEffectKind::Buff(StatKind::Def), 2, 200));
        let stats = EffectiveStats::compute(&c, &PassiveRegistry::standard());
        // 20 × 2 + iron skin flat
        assert_eq!(stats.def, 40 + crate::effect::passive::IRON_SKIN_DEF);
    }

    #[test]
    fn rage_scales_with_stacks() {
        let mut c = fighter(PartyOrigin::Host, 0, base(), 100, 0);
        c.effects.apply(StatusEffect::new(StatusEffectKind::Rage, 3, 10));
        c.effects.apply(StatusEffect::new(StatusEffectKind::Rage, 3, 10));
        let stats = EffectiveStats::compute(&c, &PassiveRegistry::standard());
        assert_eq!(stats.atk, 120);
    }

    #[test]
    fn capped_rage_with_huge_magnitude_clamps_instead_of_overflowing() {
        let mut c = fighter(PartyOrigin::Host, 0, base(), 100, 0);
        for _ in 0..StatusEffect::MAX_STACKS {
            c.effects.apply(StatusEffect::new(StatusEffectKind::Rage, 3, i32::MAX));
        }
        c.effects
            .apply(StatusEffect::new(StatusEffectKind::Buff(StatKind::Atk), 3, i32::MAX));
        let stats = EffectiveStats::compute(&c, &PassiveRegistry::standard());
        assert_eq!(stats.atk, StatBounds::COMBAT.max);
    }

    #[test]
    fn rates_are_clamped() {
        let mut c = fighter(
            PartyOrigin::Host,
            0,
            base().with(StatKind::DodgeRate, 80),
            100,
            0,
        );
        c.effects
            .apply(StatusEffect::new(StatusEffectKind::Buff(StatKind::DodgeRate), 2, 200));
        let stats = EffectiveStats::compute(&c, &PassiveRegistry::standard());
        assert_eq!(stats.dodge_rate, 100);
        assert_eq!(stats.entries().count(), 9);
    }
}
