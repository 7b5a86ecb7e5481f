//! Event payloads.

use battle_core::{
    ActionError, ActionIntent, ActionReport, InstanceId, LogEntry, Resolution, RoundReport,
    StateRoot,
};
use serde::{Deserialize, Serialize};

use super::Topic;

/// Why a combatant's turn passed without an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    Stunned,
    /// Every attempt was rejected.
    RetriesExhausted,
    /// The intent was malformed or named a combatant not in the battle.
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleEvent {
    RoundStarted {
        round: u32,
    },
    TurnStarted {
        actor: InstanceId,
        round: u32,
    },
    TurnSkipped {
        actor: InstanceId,
        reason: SkipReason,
    },
    ActionResolved {
        report: ActionReport,
    },
    /// The intent was refused. Recoverable errors are followed by a new
    /// prompt for the same actor.
    ActionRejected {
        actor: InstanceId,
        error: ActionError,
    },
    /// A follower saw the host relay an intent it is about to resolve.
    ActionRelayed {
        intent: ActionIntent,
    },
    RoundEnded {
        report: RoundReport,
    },
    Log(LogEntry),
    StateSynced {
        round: u32,
        state_root: StateRoot,
    },
    BattleEnded {
        resolution: Resolution,
    },
}

impl BattleEvent {
    pub fn topic(&self) -> Topic {
        match self {
            BattleEvent::RoundStarted { .. }
            | BattleEvent::TurnStarted { .. }
            | BattleEvent::TurnSkipped { .. }
            | BattleEvent::RoundEnded { .. } => Topic::Turn,
            BattleEvent::ActionResolved { .. }
            | BattleEvent::ActionRejected { .. }
            | BattleEvent::ActionRelayed { .. } => Topic::Action,
            BattleEvent::Log(_) => Topic::Log,
            BattleEvent::StateSynced { .. } | BattleEvent::BattleEnded { .. } => Topic::Session,
        }
    }
}
