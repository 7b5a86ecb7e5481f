//! Typed peer link.
//!
//! [`RemotePeer`] wraps a [`Transport`] with the JSON codec and the router.
//! Malformed and out-of-order messages are logged and discarded here, so the
//! drivers above only ever see routed directives or a disconnect.

use std::time::Duration;

use battle_core::{
    ActionIntent, AuthorityRole, BattleSession, InstanceId, LogEntry, Resolution, StateRoot,
};

use super::codec::{self, CodecError};
use super::{Directive, NetworkMessage, route};
use crate::api::{ActionProvider, Result, RuntimeError};
use crate::net::{Transport, TransportError};

/// Where a turn's intent ended up coming from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnInput {
    Intent(ActionIntent),
    /// The peer ended the battle while the turn was open.
    Ended(Resolution),
}

pub struct RemotePeer {
    transport: Box<dyn Transport>,
}

impl RemotePeer {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_boxed(Box::new(transport))
    }

    pub fn from_boxed(transport: Box<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn send(&mut self, message: &NetworkMessage) -> Result<()> {
        let frame = codec::encode(message)?;
        tracing::trace!(target: "battle::sync", tag = message.tag(), bytes = frame.len(), "send");
        self.transport.send(frame).await.map_err(|error| match error {
            TransportError::Closed => RuntimeError::PeerDisconnected,
            other => RuntimeError::Transport(other),
        })
    }

    /// Next decoded message, or `None` once the peer is gone.
    pub async fn recv(&mut self) -> Option<std::result::Result<NetworkMessage, CodecError>> {
        let frame = self.transport.recv().await?;
        Some(codec::decode(&frame))
    }

    pub async fn close(&mut self) {
        self.transport.close().await;
    }

    pub async fn send_logs(&mut self, log: &[LogEntry]) -> Result<()> {
        for entry in log {
            self.send(&NetworkMessage::LogMessage(entry.clone())).await?;
        }
        Ok(())
    }

    /// Broadcasts the authoritative state and returns its root.
    pub async fn sync_state(&mut self, session: &BattleSession) -> Result<StateRoot> {
        let snapshot = session.snapshot()?;
        let root = snapshot.state_root;
        self.send(&NetworkMessage::SyncGameState(snapshot)).await?;
        Ok(root)
    }

    /// Receives and routes messages until one is accepted, then commits the
    /// routed session into `session`.
    ///
    /// Only the transport read awaits, so dropping this future never loses a
    /// routed message.
    pub async fn next_directive(
        &mut self,
        session: &mut BattleSession,
        role: AuthorityRole,
    ) -> Result<Directive> {
        loop {
            let message = match self.recv().await {
                None => return Err(RuntimeError::PeerDisconnected),
                Some(Ok(message)) => message,
                Some(Err(error)) => {
                    tracing::warn!(target: "battle::sync", error = %error, "discarding undecodable frame");
                    continue;
                }
            };
            let tag = message.tag();
            match route(session, message, role) {
                Ok(routed) => {
                    tracing::trace!(target: "battle::sync", tag, directive = ?routed.directive, "routed");
                    *session = routed.session;
                    return Ok(routed.directive);
                }
                Err(error) => {
                    tracing::warn!(target: "battle::sync", tag, error = %error, "protocol violation, message discarded");
                }
            }
        }
    }

    /// Host side of a remote turn: asks the follower for `actor`'s intent and
    /// waits for it, at most `timeout` when set.
    pub async fn request_intent(
        &mut self,
        session: &mut BattleSession,
        actor: InstanceId,
        timeout: Option<Duration>,
    ) -> Result<TurnInput> {
        self.send(&NetworkMessage::RequestAction { actor }).await?;
        match timeout {
            Some(limit) => tokio::time::timeout(limit, self.await_intent(session, actor))
                .await
                .map_err(|_| RuntimeError::RemoteTimeout { actor })?,
            None => self.await_intent(session, actor).await,
        }
    }

    async fn await_intent(
        &mut self,
        session: &mut BattleSession,
        actor: InstanceId,
    ) -> Result<TurnInput> {
        loop {
            match self.next_directive(session, AuthorityRole::Host).await? {
                Directive::IntentReceived(intent) => return Ok(TurnInput::Intent(intent)),
                Directive::Ended(resolution) => return Ok(TurnInput::Ended(resolution)),
                other => {
                    tracing::debug!(target: "battle::sync", actor = %actor, directive = ?other, "ignored while waiting for intent");
                }
            }
        }
    }

    /// Asks the local provider for `actor`'s intent while still listening to
    /// the peer, so a `battle_end` (or a disconnect) interrupts the wait.
    ///
    /// Anything else the peer sends during a local turn is discarded.
    pub async fn local_intent(
        &mut self,
        provider: &dyn ActionProvider,
        session: &mut BattleSession,
        actor: InstanceId,
        role: AuthorityRole,
    ) -> Result<TurnInput> {
        let (next, resolution) = {
            let view: &BattleSession = session;
            let mut pending = provider.provide_action(actor, view);
            loop {
                tokio::select! {
                    intent = &mut pending => return intent.map(TurnInput::Intent),
                    inbound = self.recv() => {
                        let message = match inbound {
                            None => return Err(RuntimeError::PeerDisconnected),
                            Some(Ok(message)) => message,
                            Some(Err(error)) => {
                                tracing::warn!(target: "battle::sync", error = %error, "discarding undecodable frame");
                                continue;
                            }
                        };
                        let tag = message.tag();
                        match route(view, message, role) {
                            Ok(routed) => match routed.directive {
                                Directive::Ended(resolution) => break (routed.session, resolution),
                                other => {
                                    tracing::warn!(target: "battle::sync", tag, directive = ?other, "unexpected during a local turn, discarded");
                                }
                            },
                            Err(error) => {
                                tracing::warn!(target: "battle::sync", tag, error = %error, "protocol violation, message discarded");
                            }
                        }
                    }
                }
            }
        };
        *session = next;
        Ok(TurnInput::Ended(resolution))
    }
}
