//! JSON frame codec for [`NetworkMessage`].

use thiserror::Error;

use super::NetworkMessage;

/// Largest frame either side accepts.
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode {tag}")]
    Encode {
        tag: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed frame")]
    Decode(#[source] serde_json::Error),

    #[error("frame of {size} bytes exceeds the {max} byte limit")]
    Oversized { size: usize, max: usize },
}

pub fn encode(message: &NetworkMessage) -> Result<Vec<u8>, CodecError> {
    let frame = serde_json::to_vec(message).map_err(|source| CodecError::Encode {
        tag: message.tag(),
        source,
    })?;
    check_size(frame.len())?;
    Ok(frame)
}

pub fn decode(frame: &[u8]) -> Result<NetworkMessage, CodecError> {
    check_size(frame.len())?;
    serde_json::from_slice(frame).map_err(CodecError::Decode)
}

fn check_size(size: usize) -> Result<(), CodecError> {
    if size > MAX_FRAME_BYTES {
        return Err(CodecError::Oversized {
            size,
            max: MAX_FRAME_BYTES,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{ActionIntent, BattleOutcome, InstanceId, LogEntry, ResolutionReason};
    use serde_json::{Value, json};

    fn wire(message: &NetworkMessage) -> Value {
        serde_json::from_slice(&encode(message).unwrap()).unwrap()
    }

    #[test]
    fn unit_tags_carry_no_payload() {
        assert_eq!(wire(&NetworkMessage::StartBattle), json!({"type": "start_battle"}));
    }

    #[test]
    fn payloads_sit_under_the_payload_key() {
        let value = wire(&NetworkMessage::RequestAction {
            actor: InstanceId::guest(1),
        });
        assert_eq!(value["type"], "request_action");
        assert_eq!(value["payload"]["actor"], json!({"origin": "guest", "slot": 1}));

        let value = wire(&NetworkMessage::BattleEnd {
            result: BattleOutcome::Win,
            reason: ResolutionReason::Forfeit,
        });
        assert_eq!(value, json!({
            "type": "battle_end",
            "payload": {"result": "win", "reason": "forfeit"}
        }));
    }

    #[test]
    fn intents_survive_the_wire() {
        let message = NetworkMessage::ExecuteAction(ActionIntent::skill(
            InstanceId::guest(0),
            "Firebolt",
            Some(InstanceId::host(2)),
        ));
        assert_eq!(decode(&encode(&message).unwrap()).unwrap(), message);

        let log = NetworkMessage::LogMessage(LogEntry::damage("Knight takes 12 damage"));
        assert_eq!(decode(&encode(&log).unwrap()).unwrap(), log);
    }

    #[test]
    fn garbage_and_unknown_tags_are_rejected() {
        assert!(matches!(decode(b"not json"), Err(CodecError::Decode(_))));
        assert!(matches!(
            decode(br#"{"type":"teleport","payload":{}}"#),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn oversized_frames_are_rejected_before_parsing() {
        let frame = vec![b' '; MAX_FRAME_BYTES + 1];
        assert!(matches!(decode(&frame), Err(CodecError::Oversized { .. })));
    }
}
