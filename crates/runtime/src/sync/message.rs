//! Messages exchanged between host and follower.
//!
//! Each message is an adjacently tagged record, `{"type": "<tag>", "payload":
//! ...}`. Payload-less tags omit the `payload` key.

use battle_core::{
    ActionIntent, BattleOutcome, CharacterTemplate, GameStateSnapshot, InstanceId, LogEntry,
    ResolutionReason,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum NetworkMessage {
    /// The sender's roster, in slot order. Sent once by each side.
    PartyData(Vec<CharacterTemplate>),
    /// Host only: both rosters are in, the battle is active.
    StartBattle,
    /// Host only: the follower must declare an action for this combatant.
    RequestAction { actor: InstanceId },
    /// Follower to host: the declared intent. Host to follower: the intent
    /// about to be resolved, followed by the resulting state.
    ExecuteAction(ActionIntent),
    /// Host only: authoritative post-action state.
    SyncGameState(GameStateSnapshot),
    /// Display-only battle log line.
    LogMessage(LogEntry),
    /// `result` is from the sender's point of view.
    BattleEnd {
        result: BattleOutcome,
        reason: ResolutionReason,
    },
}

impl NetworkMessage {
    /// Wire tag, for logs and protocol errors.
    pub fn tag(&self) -> &'static str {
        match self {
            NetworkMessage::PartyData(_) => "party_data",
            NetworkMessage::StartBattle => "start_battle",
            NetworkMessage::RequestAction { .. } => "request_action",
            NetworkMessage::ExecuteAction(_) => "execute_action",
            NetworkMessage::SyncGameState(_) => "sync_game_state",
            NetworkMessage::LogMessage(_) => "log_message",
            NetworkMessage::BattleEnd { .. } => "battle_end",
        }
    }
}
