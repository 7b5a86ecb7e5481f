use crate::env::{CombatRng, shuffle};
use crate::log::LogEntry;
use crate::state::{InstanceId, StatusEffectKind};
use crate::stats::EffectiveStats;

use super::BattleEngine;

/// What happens when a combatant's turn comes up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnGate {
    /// The turn is open: an intent for this combatant may be executed.
    Act,
    /// Defeated earlier in the round (or no longer in the roster).
    Defeated,
    /// Stun consumed; the combatant loses this action.
    Stunned { log: LogEntry },
    /// The battle is no longer active.
    Ended,
}

impl<'a> BattleEngine<'a> {
    /// Living combatants in acting order for the current round.
    ///
    /// Fastest effective speed first. Ties are broken by a shuffle drawn from
    /// `rng` before the stable sort, so equal-speed combatants do not always
    /// favour the host party.
    pub fn turn_order(&self, rng: &mut dyn CombatRng) -> Vec<InstanceId> {
        let passives = &self.rules.passives;
        let mut order: Vec<(InstanceId, i32)> = self
            .session
            .parties
            .living()
            .map(|c| (c.instance_id, EffectiveStats::compute(c, passives).spd))
            .collect();
        shuffle(&mut order, rng);
        order.sort_by(|a, b| b.1.cmp(&a.1));
        order.into_iter().map(|(id, _)| id).collect()
    }

    /// Opens the turn for `id` unless it is defeated or stunned.
    pub fn turn_gate(&mut self, id: InstanceId) -> TurnGate {
        if !self.session.is_active() {
            return TurnGate::Ended;
        }
        let Some(combatant) = self.session.parties.get_mut(id) else {
            return TurnGate::Defeated;
        };
        if combatant.is_defeated() {
            return TurnGate::Defeated;
        }
        if combatant.effects.remove(StatusEffectKind::Stun).is_some() {
            return TurnGate::Stunned {
                log: LogEntry::status(format!("{} is stunned and cannot act", combatant.name)),
            };
        }
        self.session.acting = Some(id);
        TurnGate::Act
    }

    /// Combatant whose turn is currently open.
    pub fn acting(&self) -> Option<InstanceId> {
        self.session.acting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Rulebook, SequenceRng};
    use crate::state::fixtures::fighter;
    use crate::state::{BattleSession, PartyOrigin, StatusEffect};
    use crate::stats::{BaseStats, StatKind};

    fn session(speeds: &[(PartyOrigin, u8, i32)]) -> BattleSession {
        let mut host = Vec::new();
        let mut guest = Vec::new();
        for &(origin, slot, spd) in speeds {
            let c = fighter(origin, slot, BaseStats::default().with(StatKind::Spd, spd), 50, 0);
            match origin {
                PartyOrigin::Host => host.push(c),
                PartyOrigin::Guest => guest.push(c),
            }
        }
        let mut session = BattleSession::local(host, guest).unwrap();
        session.start().unwrap();
        session
    }

    #[test]
    fn order_follows_effective_speed() {
        let mut s = session(&[
            (PartyOrigin::Host, 0, 20),
            (PartyOrigin::Host, 1, 45),
            (PartyOrigin::Guest, 0, 30),
        ]);
        s.parties
            .get_mut(InstanceId::host(0))
            .unwrap()
            .effects
            .apply(StatusEffect::new(StatusEffectKind::Buff(StatKind::Spd), 2, 200));
        let rules = Rulebook::default();
        let engine = BattleEngine::new(&mut s, &rules);
        let order = engine.turn_order(&mut SequenceRng::constant(0));
        assert_eq!(
            order,
            vec![InstanceId::host(1), InstanceId::host(0), InstanceId::guest(0)]
        );
    }

    #[test]
    fn ties_depend_on_the_shuffle() {
        let mut s = session(&[(PartyOrigin::Host, 0, 30), (PartyOrigin::Guest, 0, 30)]);
        let rules = Rulebook::default();
        let engine = BattleEngine::new(&mut s, &rules);
        let mut seen = std::collections::BTreeSet::new();
        for value in 0..4 {
            seen.insert(engine.turn_order(&mut SequenceRng::constant(value))[0]);
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn stun_is_consumed_by_the_gate() {
        let mut s = session(&[(PartyOrigin::Host, 0, 30), (PartyOrigin::Guest, 0, 30)]);
        s.parties
            .get_mut(InstanceId::guest(0))
            .unwrap()
            .effects
            .apply(StatusEffect::new(StatusEffectKind::Stun, 1, 0));
        let rules = Rulebook::default();
        let mut engine = BattleEngine::new(&mut s, &rules);

        assert!(matches!(
            engine.turn_gate(InstanceId::guest(0)),
            TurnGate::Stunned { .. }
        ));
        assert_eq!(engine.acting(), None);
        assert_eq!(engine.turn_gate(InstanceId::guest(0)), TurnGate::Act);
        assert_eq!(engine.acting(), Some(InstanceId::guest(0)));
    }

    #[test]
    fn defeated_and_unknown_ids_cannot_act() {
        let mut s = session(&[(PartyOrigin::Host, 0, 30), (PartyOrigin::Guest, 0, 30)]);
        s.parties.get_mut(InstanceId::guest(0)).unwrap().apply_damage(999);
        let rules = Rulebook::default();
        let mut engine = BattleEngine::new(&mut s, &rules);
        assert_eq!(engine.turn_gate(InstanceId::guest(0)), TurnGate::Defeated);
        assert_eq!(engine.turn_gate(InstanceId::guest(3)), TurnGate::Defeated);
    }
}
