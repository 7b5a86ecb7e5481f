//! Round loop for local battles and the host side of networked ones.
//!
//! The runner owns the battle session exclusively. Every mutation goes through
//! `battle_core::BattleEngine`; in a networked match each mutation is followed
//! by a `sync_game_state` broadcast so the follower never computes anything.

use std::sync::Arc;

use battle_core::{
    ActionReport, AuthorityRole, BattleEngine, BattleError, BattleOutcome, BattleSession,
    CharacterTemplate, InstanceId, LogEntry, PartyOrigin, Resolution, ResolutionReason, Rulebook,
    Side, TurnGate, instantiate_party,
};
use tokio_util::sync::CancellationToken;

use crate::api::{ActionProvider, ProviderKind, Result, RuntimeError, ScriptedProvider};
use crate::config::RuntimeConfig;
use crate::events::{BattleEvent, EventBus, SkipReason};
use crate::net::Transport;
use crate::rng::StdCombatRng;
use crate::sync::{self, NetworkMessage, RemotePeer, TurnInput};

/// How a finished battle went.
#[derive(Debug, Clone)]
pub struct BattleSummary {
    pub resolution: Resolution,
    /// Round counter when the battle ended.
    pub rounds: u32,
    pub session: BattleSession,
}

enum Opponent {
    /// Both sides are played on this machine.
    Local(Arc<dyn ActionProvider>),
    /// The opponent is a networked follower.
    Remote(RemotePeer),
}

/// Drives a battle from start to resolution.
pub struct BattleRunner {
    config: RuntimeConfig,
    rules: Arc<Rulebook>,
    session: BattleSession,
    own: Arc<dyn ActionProvider>,
    /// Drives own-party members marked [`Side::Ally`].
    allies: Option<Arc<dyn ActionProvider>>,
    opponent: Opponent,
    rng: StdCombatRng,
    events: EventBus,
    cancel: CancellationToken,
}

impl BattleRunner {
    /// Create a new runner builder
    pub fn builder() -> BattleRunnerBuilder {
        BattleRunnerBuilder::new()
    }

    /// Cloneable handle to the event bus
    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    pub fn session(&self) -> &BattleSession {
        &self.session
    }

    /// Token that ends the battle as an abandonment when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Plays rounds until the battle resolves.
    ///
    /// Losing the peer (disconnect or remote timeout) is a forfeit win for
    /// this side; cancelling is an abandonment loss.
    pub async fn run(mut self) -> Result<BattleSummary> {
        let cancel = self.cancel.clone();
        let played = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.play() => Some(result),
        };

        let resolution = match played {
            Some(Ok(resolution)) => resolution,
            None => {
                tracing::info!(target: "battle::scheduler", "battle abandoned");
                self.finish(Resolution::new(BattleOutcome::Lose, ResolutionReason::Abandoned))
                    .await
            }
            Some(Err(RuntimeError::PeerDisconnected)) => {
                tracing::warn!(target: "battle::sync", "peer disconnected, battle forfeited");
                self.session
                    .resolve(Resolution::new(BattleOutcome::Win, ResolutionReason::Forfeit))
            }
            Some(Err(RuntimeError::RemoteTimeout { actor })) => {
                tracing::warn!(target: "battle::sync", actor = %actor, "remote action timed out, battle forfeited");
                self.finish(Resolution::new(BattleOutcome::Win, ResolutionReason::Forfeit))
                    .await
            }
            Some(Err(error)) => return Err(error),
        };

        if let Opponent::Remote(peer) = &mut self.opponent {
            peer.close().await;
        }
        tracing::info!(
            target: "battle::scheduler",
            outcome = %resolution.outcome,
            reason = ?resolution.reason,
            round = self.session.round,
            "battle ended"
        );
        self.events.publish(BattleEvent::BattleEnded { resolution });
        Ok(BattleSummary {
            resolution,
            rounds: self.session.round,
            session: self.session,
        })
    }

    async fn play(&mut self) -> Result<Resolution> {
        tracing::info!(target: "battle::scheduler", mode = ?self.session.mode, "battle started");
        loop {
            if let Some(resolution) = self.play_round().await? {
                return Ok(resolution);
            }
        }
    }

    async fn play_round(&mut self) -> Result<Option<Resolution>> {
        let rules = Arc::clone(&self.rules);

        let report = BattleEngine::new(&mut self.session, &rules).begin_round();
        let round = report.round;
        tracing::debug!(target: "battle::scheduler", round, "round started");
        self.events.publish(BattleEvent::RoundStarted { round });
        self.publish_logs(&report.log);
        self.broadcast(&report.log).await?;

        let order = BattleEngine::new(&mut self.session, &rules).turn_order(&mut self.rng);
        for actor in order {
            let gate = BattleEngine::new(&mut self.session, &rules).turn_gate(actor);
            match gate {
                TurnGate::Act => {
                    self.events.publish(BattleEvent::TurnStarted { actor, round });
                    if let Some(resolution) = self.take_turn(actor).await? {
                        return Ok(Some(resolution));
                    }
                }
                TurnGate::Stunned { log } => {
                    tracing::debug!(target: "battle::scheduler", actor = %actor, "stunned");
                    self.events.publish(BattleEvent::TurnSkipped {
                        actor,
                        reason: SkipReason::Stunned,
                    });
                    let log = [log];
                    self.publish_logs(&log);
                    self.broadcast(&log).await?;
                }
                TurnGate::Defeated => continue,
                TurnGate::Ended => return Ok(self.session.resolution()),
            }

            if let Some(resolution) = BattleEngine::new(&mut self.session, &rules).check_outcome() {
                return Ok(Some(self.finish(resolution).await));
            }
            if !self.config.action_delay.is_zero() {
                tokio::time::sleep(self.config.action_delay).await;
            }
        }

        let report = BattleEngine::new(&mut self.session, &rules).end_round();
        self.publish_logs(&report.log);
        self.broadcast(&report.log).await?;
        self.events.publish(BattleEvent::RoundEnded { report });

        match BattleEngine::new(&mut self.session, &rules).check_outcome() {
            Some(resolution) => Ok(Some(self.finish(resolution).await)),
            None => Ok(None),
        }
    }

    /// Runs one open turn, re-prompting after recoverable rejections.
    ///
    /// Returns a resolution only when the peer ended the battle mid-turn.
    async fn take_turn(&mut self, actor: InstanceId) -> Result<Option<Resolution>> {
        let rules = Arc::clone(&self.rules);
        let attempts = self.config.max_action_retries.saturating_add(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let intent = match self.next_intent(actor).await? {
                TurnInput::Intent(intent) => intent,
                TurnInput::Ended(resolution) => return Ok(Some(resolution)),
            };

            let result = BattleEngine::new(&mut self.session, &rules).execute(&intent, &mut self.rng);
            let error = match result {
                Ok(report) => {
                    tracing::debug!(
                        target: "battle::scheduler",
                        actor = %actor,
                        kind = %intent.kind,
                        events = report.events.len(),
                        "action resolved"
                    );
                    self.publish_logs(&report.log);
                    self.relay(&report).await?;
                    self.events.publish(BattleEvent::ActionResolved { report });
                    return Ok(None);
                }
                Err(error) => error,
            };

            let entry = error.log_entry();
            self.events.publish(BattleEvent::ActionRejected {
                actor,
                error: error.clone(),
            });
            self.publish_logs(std::slice::from_ref(&entry));
            self.send_logs(std::slice::from_ref(&entry)).await?;

            let recoverable = error.severity().is_recoverable();
            if recoverable && attempt < attempts {
                tracing::debug!(
                    target: "battle::scheduler",
                    actor = %actor,
                    attempt,
                    code = error.error_code(),
                    "action rejected, asking again"
                );
                continue;
            }

            tracing::warn!(
                target: "battle::scheduler",
                actor = %actor,
                code = error.error_code(),
                severity = error.severity().as_str(),
                error = %error,
                "turn lost"
            );
            BattleEngine::new(&mut self.session, &rules).end_turn();
            let reason = if recoverable {
                SkipReason::RetriesExhausted
            } else {
                SkipReason::Aborted
            };
            self.events.publish(BattleEvent::TurnSkipped { actor, reason });
            return Ok(None);
        }
    }

    /// Provider for a combatant on the local seat.
    fn seat_provider(&self, actor: InstanceId) -> Arc<dyn ActionProvider> {
        let side = self.session.combatant(actor).map(|c| c.side);
        match (side, &self.allies) {
            (Some(Side::Ally), Some(allies)) => Arc::clone(allies),
            _ => Arc::clone(&self.own),
        }
    }

    async fn next_intent(&mut self, actor: InstanceId) -> Result<TurnInput> {
        let own_seat = actor.origin == self.session.local;
        let seat = self.seat_provider(actor);
        match (&mut self.opponent, own_seat) {
            (Opponent::Remote(peer), true) => {
                peer.local_intent(seat.as_ref(), &mut self.session, actor, AuthorityRole::Host)
                    .await
            }
            (Opponent::Remote(peer), false) => {
                peer.request_intent(&mut self.session, actor, self.config.remote_action_timeout)
                    .await
            }
            (Opponent::Local(_), true) => seat
                .provide_action(actor, &self.session)
                .await
                .map(TurnInput::Intent),
            (Opponent::Local(provider), false) => provider
                .provide_action(actor, &self.session)
                .await
                .map(TurnInput::Intent),
        }
    }

    /// Resolves the session and tells the peer, if any.
    async fn finish(&mut self, resolution: Resolution) -> Resolution {
        let resolution = self.session.resolve(resolution);
        if let Opponent::Remote(peer) = &mut self.opponent {
            let message = NetworkMessage::BattleEnd {
                result: resolution.outcome,
                reason: resolution.reason,
            };
            if let Err(error) = peer.send(&message).await {
                tracing::debug!(target: "battle::sync", error = %error, "could not deliver battle_end");
            }
        }
        resolution
    }

    fn publish_logs(&self, log: &[LogEntry]) {
        for entry in log {
            self.events.publish(BattleEvent::Log(entry.clone()));
        }
    }

    async fn send_logs(&mut self, log: &[LogEntry]) -> Result<()> {
        if let Opponent::Remote(peer) = &mut self.opponent {
            peer.send_logs(log).await?;
        }
        Ok(())
    }

    /// Sends the log lines and the resulting state to the follower.
    async fn broadcast(&mut self, log: &[LogEntry]) -> Result<()> {
        let Opponent::Remote(peer) = &mut self.opponent else {
            return Ok(());
        };
        peer.send_logs(log).await?;
        let state_root = peer.sync_state(&self.session).await?;
        tracing::trace!(target: "battle::sync", round = self.session.round, root = %state_root.short(), "state broadcast");
        self.events.publish(BattleEvent::StateSynced {
            round: self.session.round,
            state_root,
        });
        Ok(())
    }

    /// Relays a resolved action: the intent, its log lines, then the state.
    async fn relay(&mut self, report: &ActionReport) -> Result<()> {
        if let Opponent::Remote(peer) = &mut self.opponent {
            peer.send(&NetworkMessage::ExecuteAction(report.intent.clone()))
                .await?;
        }
        self.broadcast(&report.log).await
    }
}

/// Builder for [`BattleRunner`].
///
/// A local battle needs both parties and the own provider; the opponent
/// defaults to a scripted provider. A networked host sets `remote` instead of
/// an opponent party: `build` then performs the handshake.
pub struct BattleRunnerBuilder {
    config: RuntimeConfig,
    rules: Option<Arc<Rulebook>>,
    own_party: Vec<CharacterTemplate>,
    own_provider: Option<Arc<dyn ActionProvider>>,
    ally_provider: Option<Arc<dyn ActionProvider>>,
    opponent_party: Vec<CharacterTemplate>,
    opponent_provider: Option<Arc<dyn ActionProvider>>,
    remote: Option<Box<dyn Transport>>,
    events: Option<EventBus>,
    cancel: Option<CancellationToken>,
}

impl BattleRunnerBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            rules: None,
            own_party: Vec::new(),
            own_provider: None,
            ally_provider: None,
            opponent_party: Vec::new(),
            opponent_provider: None,
            remote: None,
            events: None,
            cancel: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Custom rules. Defaults to the standard registries with
    /// `config.battle` tunables.
    pub fn rules(mut self, rules: Rulebook) -> Self {
        self.rules = Some(Arc::new(rules));
        self
    }

    pub fn own_party(mut self, party: Vec<CharacterTemplate>) -> Self {
        self.own_party = party;
        self
    }

    pub fn own_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.own_provider = Some(Arc::new(provider));
        self
    }

    /// Hands every own-party member after the leader to `provider`. Those
    /// members are marked [`Side::Ally`].
    pub fn ally_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.ally_provider = Some(Arc::new(provider));
        self
    }

    pub fn opponent_party(mut self, party: Vec<CharacterTemplate>) -> Self {
        self.opponent_party = party;
        self
    }

    pub fn opponent_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.opponent_provider = Some(Arc::new(provider));
        self
    }

    /// Host a networked battle over `transport`.
    pub fn remote(mut self, transport: Box<dyn Transport>) -> Self {
        self.remote = Some(transport);
        self
    }

    /// Publish to an existing bus instead of a fresh one.
    pub fn events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Builds the runner. Networked hosts complete the handshake here, so
    /// this waits for the follower's roster.
    pub async fn build(self) -> Result<BattleRunner> {
        let config = self.config;
        let rules = self
            .rules
            .unwrap_or_else(|| Arc::new(Rulebook::with_config(config.battle.clone())));
        let own = self.own_provider.ok_or(RuntimeError::ProviderNotSet {
            kind: ProviderKind::Own,
        })?;
        let events = self
            .events
            .unwrap_or_else(|| EventBus::with_capacity(config.event_buffer_size));
        let cancel = self.cancel.unwrap_or_default();

        let (mut session, opponent) = match self.remote {
            Some(transport) => {
                let mut peer = RemotePeer::from_boxed(transport);
                let session = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(RuntimeError::Cancelled),
                    session = sync::handshake(&mut peer, self.own_party) => session?,
                };
                (session, Opponent::Remote(peer))
            }
            None => {
                if self.opponent_party.is_empty() {
                    return Err(RuntimeError::MissingOpponent);
                }
                let provider = self.opponent_provider.unwrap_or_else(|| {
                    let seed = config.rng_seed.map(|seed| seed.wrapping_add(1));
                    Arc::new(ScriptedProvider::from_seed(seed)) as Arc<dyn ActionProvider>
                });
                let own_members = instantiate_party(&self.own_party, PartyOrigin::Host, Side::Own)?;
                let opponent_members =
                    instantiate_party(&self.opponent_party, PartyOrigin::Guest, Side::Opponent)?;
                let mut session = BattleSession::local(own_members, opponent_members)?;
                session.start()?;
                (session, Opponent::Local(provider))
            }
        };

        if self.ally_provider.is_some() {
            let local = session.local;
            for member in session.parties.party_mut(local).iter_mut().skip(1) {
                member.side = Side::Ally;
            }
        }

        Ok(BattleRunner {
            rng: StdCombatRng::from_seed(config.rng_seed),
            config,
            rules,
            session,
            own,
            allies: self.ally_provider,
            opponent,
            events,
            cancel,
        })
    }
}
