//! Round-level battle driver.
//!
//! The [`BattleEngine`] is the only code that advances a [`BattleSession`]:
//! round boundaries, turn gating, action execution and the win check. It is
//! synchronous and owns no I/O; the runtime decides where intents come from
//! and where reports go.
//!
//! ```text
//! begin_round → turn_order → for each: turn_gate → execute → check_outcome
//!             → end_round → check_outcome
//! ```

mod outcome;
mod turns;

pub use outcome::evaluate_outcome;
pub use turns::TurnGate;

use crate::action::{ActionError, ActionIntent, ActionReport, resolve_action};
use crate::combat::CombatEvent;
use crate::env::{CombatRng, Rulebook};
use crate::log::LogEntry;
use crate::state::{BattleSession, Resolution, ResolutionReason};

/// Changes produced at a round boundary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundReport {
    pub round: u32,
    pub events: Vec<CombatEvent>,
    pub log: Vec<LogEntry>,
}

pub struct BattleEngine<'a> {
    session: &'a mut BattleSession,
    rules: &'a Rulebook,
}

impl<'a> BattleEngine<'a> {
    pub fn new(session: &'a mut BattleSession, rules: &'a Rulebook) -> Self {
        Self { session, rules }
    }

    pub fn session(&self) -> &BattleSession {
        self.session
    }

    pub fn rules(&self) -> &Rulebook {
        self.rules
    }

    /// Runs round-start passives.
    pub fn begin_round(&mut self) -> RoundReport {
        let round = self.session.round;
        let mut report = RoundReport {
            round,
            ..RoundReport::default()
        };
        report
            .log
            .push(LogEntry::system(format!("Round {}", round + 1)));
        crate::effect::run_round_start(
            &mut self.session.parties,
            round,
            &self.rules.config,
            &self.rules.passives,
            &mut report.events,
            &mut report.log,
        );
        report
    }

    /// Resolves the open turn's intent. On success the turn closes; on a
    /// recoverable error it stays open so the actor can choose again.
    pub fn execute(
        &mut self,
        intent: &ActionIntent,
        rng: &mut dyn CombatRng,
    ) -> Result<ActionReport, ActionError> {
        if !self.session.is_active() {
            return Err(ActionError::NotActive);
        }
        if self.session.acting != Some(intent.actor) {
            return Err(ActionError::NotActorsTurn {
                actor: intent.actor,
            });
        }

        let report = resolve_action(&mut self.session.parties, intent, self.rules, rng)?;
        self.session.acting = None;
        Ok(report)
    }

    /// Closes the open turn without an action (aborted or forfeited turn).
    pub fn end_turn(&mut self) {
        self.session.acting = None;
    }

    /// Runs round-end ticks and passives, then advances the round counter.
    pub fn end_round(&mut self) -> RoundReport {
        let round = self.session.round;
        let mut report = RoundReport {
            round,
            ..RoundReport::default()
        };
        crate::effect::run_round_end(
            &mut self.session.parties,
            round,
            &self.rules.config,
            &self.rules.passives,
            &mut report.events,
            &mut report.log,
        );
        self.session.acting = None;
        self.session.round += 1;
        report
    }

    /// Resolves the session if one side has no living members left.
    pub fn check_outcome(&mut self) -> Option<Resolution> {
        if !self.session.is_active() {
            return self.session.resolution();
        }
        let outcome = evaluate_outcome(self.session)?;
        Some(
            self.session
                .resolve(Resolution::new(outcome, ResolutionReason::Defeat)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionKind, Skill, SkillRoutine, TargetScope};
    use crate::env::SequenceRng;
    use crate::state::fixtures::fighter;
    use crate::state::{
        BattleOutcome, Combatant, InstanceId, PartyOrigin, StatusEffect, StatusEffectKind,
    };
    use crate::stats::{BaseStats, StatKind};

    fn unit(origin: PartyOrigin, slot: u8, spd: i32, hp: u32) -> Combatant {
        fighter(
            origin,
            slot,
            BaseStats::default()
                .with(StatKind::Spd, spd)
                .with(StatKind::Atk, 30)
                .with(StatKind::Def, 10),
            hp,
            0,
        )
    }

    fn active(own: Vec<Combatant>, opp: Vec<Combatant>) -> BattleSession {
        let mut session = BattleSession::local(own, opp).unwrap();
        session.start().unwrap();
        session
    }

    /// Plays one round where everyone attacks the first living enemy.
    fn play_round(engine: &mut BattleEngine<'_>, rng: &mut SequenceRng) -> Vec<InstanceId> {
        engine.begin_round();
        let mut acted = Vec::new();
        for id in engine.turn_order(rng) {
            if engine.turn_gate(id) != TurnGate::Act {
                continue;
            }
            let target = engine.session().parties.enemies_of(id)[0];
            engine
                .execute(&ActionIntent::attack(id, target), rng)
                .unwrap();
            acted.push(id);
            if engine.check_outcome().is_some() {
                return acted;
            }
        }
        engine.end_round();
        engine.check_outcome();
        acted
    }

    #[test]
    fn faster_party_acts_first_every_round() {
        let mut session = active(
            vec![unit(PartyOrigin::Host, 0, 60, 500)],
            vec![unit(PartyOrigin::Guest, 0, 40, 500)],
        );
        let rules = Rulebook::default();
        let mut engine = BattleEngine::new(&mut session, &rules);
        let mut rng = SequenceRng::constant(99);
        for _ in 0..3 {
            let acted = play_round(&mut engine, &mut rng);
            assert_eq!(acted, vec![InstanceId::host(0), InstanceId::guest(0)]);
        }
        assert_eq!(session.round, 3);
    }

    #[test]
    fn stun_skips_exactly_one_action() {
        let mut stunned = unit(PartyOrigin::Host, 0, 60, 500);
        stunned
            .effects
            .apply(StatusEffect::new(StatusEffectKind::Stun, 3, 0));
        let mut session = active(vec![stunned], vec![unit(PartyOrigin::Guest, 0, 40, 500)]);
        let rules = Rulebook::default();
        let mut engine = BattleEngine::new(&mut session, &rules);
        let mut rng = SequenceRng::constant(99);

        assert_eq!(play_round(&mut engine, &mut rng), vec![InstanceId::guest(0)]);
        assert!(!engine
            .session()
            .combatant(InstanceId::host(0))
            .unwrap()
            .has_effect(StatusEffectKind::Stun));
        assert_eq!(
            play_round(&mut engine, &mut rng),
            vec![InstanceId::host(0), InstanceId::guest(0)]
        );
    }

    #[test]
    fn defeated_combatants_leave_turn_order() {
        let mut session = active(
            vec![unit(PartyOrigin::Host, 0, 60, 500)],
            vec![
                unit(PartyOrigin::Guest, 0, 50, 10),
                unit(PartyOrigin::Guest, 1, 40, 500),
            ],
        );
        let rules = Rulebook::default();
        let mut engine = BattleEngine::new(&mut session, &rules);
        let mut rng = SequenceRng::constant(99);

        // host hits g0 (20 damage) first; g0 never acts
        let acted = play_round(&mut engine, &mut rng);
        assert_eq!(acted, vec![InstanceId::host(0), InstanceId::guest(1)]);
        let order = engine.turn_order(&mut rng);
        assert!(!order.contains(&InstanceId::guest(0)));
    }

    #[test]
    fn battle_ends_mid_round() {
        let mut session = active(
            vec![unit(PartyOrigin::Host, 0, 60, 500)],
            vec![unit(PartyOrigin::Guest, 0, 40, 15)],
        );
        let rules = Rulebook::default();
        let mut engine = BattleEngine::new(&mut session, &rules);
        let mut rng = SequenceRng::constant(99);

        let acted = play_round(&mut engine, &mut rng);
        assert_eq!(acted, vec![InstanceId::host(0)]);
        assert_eq!(
            session.resolution(),
            Some(Resolution::new(BattleOutcome::Win, ResolutionReason::Defeat))
        );
        assert_eq!(session.round, 0);
    }

    #[test]
    fn mutual_wipe_is_a_draw() {
        let bomber = unit(PartyOrigin::Host, 0, 60, 50).with_special(Skill::new(
            "last stand",
            SkillRoutine::SelfDestruct,
            TargetScope::AllEnemies,
        ));
        let mut session = active(vec![bomber], vec![unit(PartyOrigin::Guest, 0, 40, 15)]);
        let rules = Rulebook::default();
        let mut engine = BattleEngine::new(&mut session, &rules);
        let mut rng = SequenceRng::constant(99);

        engine.begin_round();
        let order = engine.turn_order(&mut rng);
        assert_eq!(engine.turn_gate(order[0]), TurnGate::Act);
        let intent = ActionIntent::special(order[0], "last stand", None);
        assert_eq!(intent.kind, ActionKind::Special);
        engine.execute(&intent, &mut rng).unwrap();

        assert_eq!(
            engine.check_outcome(),
            Some(Resolution::new(BattleOutcome::Draw, ResolutionReason::Defeat))
        );
    }

    #[test]
    fn rejected_action_keeps_the_turn_open() {
        let mage = unit(PartyOrigin::Host, 0, 60, 50).with_skills(vec![
            Skill::new("meteor", SkillRoutine::Damage, TargetScope::AllEnemies).cost(25),
        ]);
        let mut mage = mage;
        mage.set_resources(crate::state::Resources::full(50, 20));
        let mut session = active(vec![mage], vec![unit(PartyOrigin::Guest, 0, 40, 500)]);
        let before = session.clone();
        let rules = Rulebook::default();
        let mut engine = BattleEngine::new(&mut session, &rules);
        let mut rng = SequenceRng::constant(99);

        assert_eq!(engine.turn_gate(InstanceId::host(0)), TurnGate::Act);
        let err = engine
            .execute(&ActionIntent::skill(InstanceId::host(0), "meteor", None), &mut rng)
            .unwrap_err();
        assert!(matches!(err, ActionError::InsufficientResource { .. }));
        assert_eq!(engine.session().parties, before.parties);
        assert_eq!(engine.session().acting, Some(InstanceId::host(0)));

        engine
            .execute(&ActionIntent::defend(InstanceId::host(0)), &mut rng)
            .unwrap();
        assert_eq!(engine.session().acting, None);
    }

    #[test]
    fn only_the_open_turn_may_act() {
        let mut session = active(
            vec![unit(PartyOrigin::Host, 0, 60, 50)],
            vec![unit(PartyOrigin::Guest, 0, 40, 50)],
        );
        let rules = Rulebook::default();
        let mut engine = BattleEngine::new(&mut session, &rules);
        let mut rng = SequenceRng::constant(99);
        assert!(matches!(
            engine.execute(&ActionIntent::defend(InstanceId::guest(0)), &mut rng),
            Err(ActionError::NotActorsTurn { .. })
        ));
    }
}
