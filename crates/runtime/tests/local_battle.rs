use std::time::Duration;

use battle_core::{
    ActionError, ActionIntent, ActionKind, BaseStats, BattleOutcome, CharacterTemplate, InstanceId,
    LogCategory, Resolution, ResolutionReason, Side, Skill, SkillRoutine, StatKind,
    StatusEffectKind, TargetScope,
};
use battle_runtime::{
    BattleEvent, BattleRunner, ChannelProvider, EventBus, RuntimeConfig, RuntimeError,
    ScriptedProvider, SkipReason, Topic,
};
use tokio::sync::broadcast;

fn fighter(id: &str, spd: i32, hp: u32, mp: u32) -> CharacterTemplate {
    CharacterTemplate {
        id: id.into(),
        name: id.into(),
        base_stats: BaseStats::default()
            .with(StatKind::Spd, spd)
            .with(StatKind::Atk, 30)
            .with(StatKind::Def, 10),
        max_hp: hp,
        max_mp: mp,
        skills: Vec::new(),
        special: None,
        passive: None,
    }
}

fn config(seed: u64) -> RuntimeConfig {
    RuntimeConfig {
        event_buffer_size: 4096,
        rng_seed: Some(seed),
        ..RuntimeConfig::default()
    }
}

fn drain(rx: &mut broadcast::Receiver<BattleEvent>) -> Vec<BattleEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Cancels the battle once `stop` matches an event.
fn cancel_when(
    events: &EventBus,
    cancel: tokio_util::sync::CancellationToken,
    stop: impl Fn(&BattleEvent) -> bool + Send + 'static,
) {
    let mut rx = events.subscribe_all();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            if stop(&event) {
                cancel.cancel();
                break;
            }
        }
    });
}

#[tokio::test]
async fn faster_party_acts_first_every_round() {
    let runner = BattleRunner::builder()
        .config(config(11))
        .own_party(vec![fighter("swift", 60, 200, 0)])
        .own_provider(ScriptedProvider::seeded(1))
        .opponent_party(vec![fighter("slow", 40, 200, 0)])
        .build()
        .await
        .unwrap();
    let mut turns = runner.events().subscribe(Topic::Turn);

    let summary = runner.run().await.unwrap();
    assert_eq!(
        summary.resolution,
        Resolution::new(BattleOutcome::Win, ResolutionReason::Defeat)
    );

    let events = drain(&mut turns);
    let mut rounds = 0;
    for window in events.windows(2) {
        if let BattleEvent::RoundStarted { round } = window[0] {
            rounds += 1;
            assert_eq!(
                window[1],
                BattleEvent::TurnStarted {
                    actor: InstanceId::host(0),
                    round
                }
            );
        }
    }
    // 20 damage per hit against 200 HP.
    assert_eq!(rounds, 10);
}

#[tokio::test]
async fn simultaneous_wipe_is_a_draw() {
    let bomber = CharacterTemplate {
        special: Some(Skill::new(
            "Last Stand",
            SkillRoutine::SelfDestruct,
            TargetScope::AllEnemies,
        )),
        ..fighter("bomber", 60, 50, 0)
    };
    let (provider, input) = ChannelProvider::new(4);
    input
        .send(ActionIntent::special(InstanceId::host(0), "Last Stand", None))
        .await
        .unwrap();

    let summary = BattleRunner::builder()
        .config(config(3))
        .own_party(vec![bomber])
        .own_provider(provider)
        .opponent_party(vec![fighter("target", 40, 15, 0)])
        .build()
        .await
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(
        summary.resolution,
        Resolution::new(BattleOutcome::Draw, ResolutionReason::Defeat)
    );
    assert!(summary.session.parties.all().all(|c| c.is_defeated()));
}

#[tokio::test]
async fn stun_costs_exactly_one_action() {
    let stunner = CharacterTemplate {
        skills: vec![
            Skill::new("Stupor", SkillRoutine::ApplyStatus, TargetScope::SingleEnemy)
                .with_status(StatusEffectKind::Stun, 3, 0),
        ],
        ..fighter("stunner", 60, 500, 0)
    };
    let (own, own_input) = ChannelProvider::new(8);
    let (opponent, opponent_input) = ChannelProvider::new(8);
    let host = InstanceId::host(0);
    let guest = InstanceId::guest(0);
    opponent_input
        .send(ActionIntent::skill(guest, "Stupor", Some(host)))
        .await
        .unwrap();
    opponent_input.send(ActionIntent::attack(guest, host)).await.unwrap();
    own_input.send(ActionIntent::attack(host, guest)).await.unwrap();

    let runner = BattleRunner::builder()
        .config(config(5))
        .own_party(vec![fighter("knight", 40, 500, 0)])
        .own_provider(own)
        .opponent_party(vec![stunner])
        .opponent_provider(opponent)
        .build()
        .await
        .unwrap();
    let mut turns = runner.events().subscribe(Topic::Turn);
    cancel_when(&runner.events(), runner.cancel_token(), move |event| {
        matches!(event, BattleEvent::TurnStarted { actor, round: 2 } if *actor == guest)
    });

    let summary = tokio::time::timeout(Duration::from_secs(10), runner.run())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        summary.resolution,
        Resolution::new(BattleOutcome::Lose, ResolutionReason::Abandoned)
    );

    let events = drain(&mut turns);
    let skipped: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, BattleEvent::TurnSkipped { .. }))
        .collect();
    assert_eq!(
        skipped,
        vec![&BattleEvent::TurnSkipped {
            actor: host,
            reason: SkipReason::Stunned
        }]
    );
    assert!(events.contains(&BattleEvent::TurnStarted { actor: host, round: 1 }));
    let knight = summary.session.combatant(host).unwrap();
    assert!(!knight.has_effect(StatusEffectKind::Stun));
}

#[tokio::test]
async fn unaffordable_skill_is_rejected_without_side_effects() {
    let mage = CharacterTemplate {
        skills: vec![Skill::new("Meteor", SkillRoutine::Damage, TargetScope::AllEnemies).cost(25)],
        ..fighter("mage", 60, 50, 20)
    };
    let (provider, input) = ChannelProvider::new(4);
    let host = InstanceId::host(0);
    input.send(ActionIntent::skill(host, "Meteor", None)).await.unwrap();
    input
        .send(ActionIntent::attack(host, InstanceId::guest(0)))
        .await
        .unwrap();

    let runner = BattleRunner::builder()
        .config(config(9))
        .own_party(vec![mage])
        .own_provider(provider)
        .opponent_party(vec![fighter("weak", 40, 15, 0)])
        .build()
        .await
        .unwrap();
    let mut all = runner.events().subscribe_all();

    let summary = runner.run().await.unwrap();
    assert_eq!(summary.resolution.outcome, BattleOutcome::Win);
    assert_eq!(summary.session.combatant(host).unwrap().resources().mp(), 20);

    let events = drain(&mut all);
    let rejected = events.iter().position(|e| {
        matches!(
            e,
            BattleEvent::ActionRejected {
                error: ActionError::InsufficientResource { required: 25, available: 20, .. },
                ..
            }
        )
    });
    let resolved = events
        .iter()
        .position(|e| matches!(e, BattleEvent::ActionResolved { .. }));
    assert!(rejected.unwrap() < resolved.unwrap());
    assert!(events.iter().any(|e| matches!(
        e,
        BattleEvent::Log(entry) if entry.category == LogCategory::System && entry.text.contains("25")
    )));
}

#[tokio::test]
async fn repeated_rejections_lose_the_turn() {
    let mage = CharacterTemplate {
        skills: vec![Skill::new("Meteor", SkillRoutine::Damage, TargetScope::AllEnemies).cost(25)],
        ..fighter("mage", 60, 50, 20)
    };
    let (provider, input) = ChannelProvider::new(4);
    let host = InstanceId::host(0);
    for _ in 0..2 {
        input.send(ActionIntent::skill(host, "Meteor", None)).await.unwrap();
    }

    let runner = BattleRunner::builder()
        .config(RuntimeConfig {
            max_action_retries: 1,
            ..config(4)
        })
        .own_party(vec![mage])
        .own_provider(provider)
        .opponent_party(vec![fighter("dummy", 40, 500, 0)])
        .build()
        .await
        .unwrap();
    let mut turns = runner.events().subscribe(Topic::Turn);
    cancel_when(&runner.events(), runner.cancel_token(), |event| {
        matches!(event, BattleEvent::RoundEnded { .. })
    });

    let summary = tokio::time::timeout(Duration::from_secs(10), runner.run())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.resolution.reason, ResolutionReason::Abandoned);
    assert!(drain(&mut turns).contains(&BattleEvent::TurnSkipped {
        actor: host,
        reason: SkipReason::RetriesExhausted
    }));
}

#[tokio::test]
async fn cancelling_abandons_the_battle() {
    let (provider, _input) = ChannelProvider::new(1);
    let runner = BattleRunner::builder()
        .own_party(vec![fighter("idle", 60, 100, 0)])
        .own_provider(provider)
        .opponent_party(vec![fighter("other", 40, 100, 0)])
        .build()
        .await
        .unwrap();
    let cancel = runner.cancel_token();
    let mut ended = runner.events().subscribe(Topic::Session);
    let handle = tokio::spawn(runner.run());

    cancel.cancel();
    let summary = handle.await.unwrap().unwrap();
    let abandoned = Resolution::new(BattleOutcome::Lose, ResolutionReason::Abandoned);
    assert_eq!(summary.resolution, abandoned);
    assert_eq!(
        ended.recv().await.unwrap(),
        BattleEvent::BattleEnded {
            resolution: abandoned
        }
    );
}

#[tokio::test]
async fn builder_requires_a_provider_and_an_opponent() {
    let missing_provider = BattleRunner::builder()
        .own_party(vec![fighter("a", 10, 10, 0)])
        .opponent_party(vec![fighter("b", 10, 10, 0)])
        .build()
        .await;
    assert!(matches!(missing_provider, Err(RuntimeError::ProviderNotSet { .. })));

    let missing_opponent = BattleRunner::builder()
        .own_party(vec![fighter("a", 10, 10, 0)])
        .own_provider(ScriptedProvider::seeded(0))
        .build()
        .await;
    assert!(matches!(missing_opponent, Err(RuntimeError::MissingOpponent)));
}

#[tokio::test]
async fn allies_are_driven_by_their_own_provider() {
    let leader = InstanceId::host(0);
    let squire = InstanceId::host(1);
    let (allies, ally_input) = ChannelProvider::new(64);
    for _ in 0..64 {
        ally_input.send(ActionIntent::defend(squire)).await.unwrap();
    }

    let runner = BattleRunner::builder()
        .config(config(21))
        .own_party(vec![fighter("blade", 60, 500, 0), fighter("squire", 50, 500, 0)])
        .own_provider(ScriptedProvider::seeded(2))
        .ally_provider(allies)
        .opponent_party(vec![fighter("dummy", 10, 40, 0)])
        .build()
        .await
        .unwrap();
    let mut actions = runner.events().subscribe(Topic::Action);

    let summary = tokio::time::timeout(Duration::from_secs(10), runner.run())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.resolution.outcome, BattleOutcome::Win);
    assert_eq!(summary.session.combatant(leader).unwrap().side, Side::Own);
    assert_eq!(summary.session.combatant(squire).unwrap().side, Side::Ally);

    let squire_actions: Vec<_> = drain(&mut actions)
        .into_iter()
        .filter_map(|event| match event {
            BattleEvent::ActionResolved { report } if report.intent.actor == squire => {
                Some(report.intent.kind)
            }
            _ => None,
        })
        .collect();
    assert!(!squire_actions.is_empty());
    assert!(squire_actions.iter().all(|kind| *kind == ActionKind::Defend));
}
