//! Follower side of a networked battle.
//!
//! The follower never resolves an action. It declares intents for its own
//! combatants when the host asks, and otherwise mirrors whatever state the
//! host broadcasts.

use std::sync::Arc;

use battle_core::{
    AuthorityRole, BattleMode, BattleOutcome, BattleSession, CharacterTemplate, Resolution,
    ResolutionReason, Side, instantiate_party,
};
use tokio_util::sync::CancellationToken;

use super::{Directive, NetworkMessage, RemotePeer, TurnInput};
use crate::api::{ActionProvider, Result, RuntimeError};
use crate::events::{BattleEvent, EventBus};
use crate::net::Transport;
use crate::runtime::BattleSummary;

const ROLE: AuthorityRole = AuthorityRole::Follower;

pub struct FollowerSession {
    peer: RemotePeer,
    party: Vec<CharacterTemplate>,
    provider: Arc<dyn ActionProvider>,
    events: EventBus,
    cancel: CancellationToken,
}

impl FollowerSession {
    pub fn new(
        transport: Box<dyn Transport>,
        party: Vec<CharacterTemplate>,
        provider: Arc<dyn ActionProvider>,
    ) -> Self {
        Self {
            peer: RemotePeer::from_boxed(transport),
            party,
            provider,
            events: EventBus::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Plays the battle to its end.
    ///
    /// A disconnect while the battle is active is a forfeit win. Leaving via
    /// the cancellation token is an abandonment loss, reported to the host.
    pub async fn run(self) -> Result<BattleSummary> {
        let Self {
            mut peer,
            party,
            provider,
            events,
            cancel,
        } = self;

        let mut session = BattleSession::forming(BattleMode::Networked { role: ROLE });
        let members = instantiate_party(&party, ROLE.origin(), Side::Own)?;
        session.set_party(ROLE.origin(), members)?;
        peer.send(&NetworkMessage::PartyData(party)).await?;

        let followed = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = follow(&mut peer, &mut session, provider.as_ref(), &events) => Some(result),
        };

        let resolution = match followed {
            Some(Ok(resolution)) => resolution,
            Some(Err(RuntimeError::PeerDisconnected)) if session.is_active() => {
                tracing::warn!(target: "battle::sync", "host disconnected, battle forfeited");
                session.resolve(Resolution::new(BattleOutcome::Win, ResolutionReason::Forfeit))
            }
            None if session.is_active() => {
                tracing::info!(target: "battle::sync", "leaving the battle");
                let resolution = session.resolve(Resolution::new(
                    BattleOutcome::Lose,
                    ResolutionReason::Abandoned,
                ));
                let message = NetworkMessage::BattleEnd {
                    result: resolution.outcome,
                    reason: resolution.reason,
                };
                if let Err(error) = peer.send(&message).await {
                    tracing::debug!(target: "battle::sync", error = %error, "could not deliver battle_end");
                }
                resolution
            }
            None => {
                peer.close().await;
                return Err(RuntimeError::Cancelled);
            }
            Some(Err(error)) => {
                peer.close().await;
                return Err(error);
            }
        };

        peer.close().await;
        tracing::info!(
            target: "battle::sync",
            outcome = %resolution.outcome,
            reason = ?resolution.reason,
            "battle ended"
        );
        events.publish(BattleEvent::BattleEnded { resolution });
        Ok(BattleSummary {
            resolution,
            rounds: session.round,
            session,
        })
    }
}

async fn follow(
    peer: &mut RemotePeer,
    session: &mut BattleSession,
    provider: &dyn ActionProvider,
    events: &EventBus,
) -> Result<Resolution> {
    loop {
        match peer.next_directive(session, ROLE).await? {
            Directive::PartyReceived => {
                tracing::debug!(target: "battle::sync", "host roster received");
            }
            Directive::Started => {
                tracing::info!(target: "battle::sync", "battle started");
            }
            Directive::ActionRequested(actor) => {
                events.publish(BattleEvent::TurnStarted {
                    actor,
                    round: session.round,
                });
                match peer.local_intent(provider, session, actor, ROLE).await? {
                    TurnInput::Intent(intent) => {
                        peer.send(&NetworkMessage::ExecuteAction(intent)).await?;
                    }
                    TurnInput::Ended(resolution) => return Ok(resolution),
                }
            }
            Directive::ActionRelayed(intent) => {
                events.publish(BattleEvent::ActionRelayed { intent });
            }
            Directive::StateSynced(state_root) => {
                events.publish(BattleEvent::StateSynced {
                    round: session.round,
                    state_root,
                });
            }
            Directive::Log(entry) => events.publish(BattleEvent::Log(entry)),
            Directive::Ended(resolution) => return Ok(resolution),
            Directive::IntentReceived(_) => {}
        }
    }
}
