//! Asynchronous abstraction for sourcing combatant intent.
//!
//! Runtime users plug in [`ActionProvider`] implementations so a battle can
//! run with human input, scripted opponents, or test fixtures. Remote intent
//! in a networked match does not go through this trait: the host waits on the
//! peer link directly (see [`crate::sync::RemotePeer`]).
use std::sync::Mutex;

use async_trait::async_trait;
use battle_core::{ActionIntent, BattleSession, InstanceId, StatusEffectKind, TargetScope};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio::sync::{Mutex as AsyncMutex, mpsc};

use super::errors::{Result, RuntimeError};

/// Trait for providing an intent for the combatant whose turn is open.
///
/// Different implementations can handle:
/// - Player input (from UI/CLI)
/// - Scripted computer opponents
/// - Testing fixtures
#[async_trait]
pub trait ActionProvider: Send + Sync {
    /// Provide an intent for `actor` based on the current session.
    ///
    /// The session is read-only: validation happens when the intent is
    /// executed, and a recoverable rejection simply asks again.
    async fn provide_action(&self, actor: InstanceId, session: &BattleSession)
    -> Result<ActionIntent>;
}

/// Local input delivered over an mpsc channel.
///
/// The UI side keeps the [`mpsc::Sender`] and pushes an intent whenever it sees
/// a `TurnStarted` event for one of its combatants. Intents declared for a
/// different combatant are dropped.
pub struct ChannelProvider {
    rx: AsyncMutex<mpsc::Receiver<ActionIntent>>,
}

impl ChannelProvider {
    pub fn new(buffer: usize) -> (Self, mpsc::Sender<ActionIntent>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (
            Self {
                rx: AsyncMutex::new(rx),
            },
            tx,
        )
    }
}

#[async_trait]
impl ActionProvider for ChannelProvider {
    async fn provide_action(
        &self,
        actor: InstanceId,
        _session: &BattleSession,
    ) -> Result<ActionIntent> {
        let mut rx = self.rx.lock().await;
        loop {
            let intent = rx
                .recv()
                .await
                .ok_or(RuntimeError::ActionProviderChannelClosed)?;
            if intent.actor == actor {
                return Ok(intent);
            }
            tracing::warn!(
                target: "battle::scheduler",
                expected = %actor,
                provided = %intent.actor,
                "dropping intent declared for another combatant"
            );
        }
    }
}

/// Computer-controlled opponent.
///
/// Picks a random living enemy, or the taunter when one is present, and uses
/// an affordable hostile skill when one exists. Never uses specials.
pub struct ScriptedProvider {
    rng: Mutex<StdRng>,
}

impl ScriptedProvider {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Seeded when `seed` is set, otherwise from entropy.
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    fn decide(&self, actor: InstanceId, session: &BattleSession) -> ActionIntent {
        let Some(me) = session.combatant(actor) else {
            return ActionIntent::defend(actor);
        };
        let enemies = session.parties.enemies_of(actor);
        if enemies.is_empty() {
            return ActionIntent::defend(actor);
        }

        let taunter = enemies.iter().copied().find(|&id| {
            session
                .combatant(id)
                .is_some_and(|c| c.has_effect(StatusEffectKind::Taunt))
        });

        let affordable: Vec<_> = if me.has_effect(StatusEffectKind::Void) {
            Vec::new()
        } else {
            me.skills
                .iter()
                .filter(|skill| skill.mp_cost <= me.resources().mp())
                .filter(|skill| {
                    matches!(skill.scope, TargetScope::SingleEnemy | TargetScope::AllEnemies)
                })
                .collect()
        };

        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let target = taunter
            .or_else(|| enemies.choose(&mut *rng).copied())
            .unwrap_or(enemies[0]);

        if let Some(skill) = affordable.choose(&mut *rng) {
            let declared = skill.scope.needs_target().then_some(target);
            return ActionIntent::skill(actor, skill.name.clone(), declared);
        }
        ActionIntent::attack(actor, target)
    }
}

#[async_trait]
impl ActionProvider for ScriptedProvider {
    async fn provide_action(
        &self,
        actor: InstanceId,
        session: &BattleSession,
    ) -> Result<ActionIntent> {
        Ok(self.decide(actor, session))
    }
}
