//! Action execution errors.
//!
//! Every variant leaves the session untouched: the resolver works on a copy
//! and only commits on success.

use crate::error::{BattleError, ErrorSeverity};
use crate::log::LogEntry;
use crate::state::{InstanceId, ResourceError, ResourcePool};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    /// Not enough MP (or HP) to pay the skill's cost.
    #[error("{actor} does not have enough {pool} ({available}/{required})")]
    InsufficientResource {
        actor: InstanceId,
        pool: ResourcePool,
        required: u32,
        available: u32,
    },

    /// The actor has no skill or special by that name, or its routine is not
    /// registered.
    #[error("{actor} has no skill named '{name}'")]
    UnknownSkill { actor: InstanceId, name: String },

    /// Target on the wrong side, defeated, or not allowed by the skill's scope.
    #[error("invalid target: {reason}")]
    InvalidTarget { reason: String },

    /// `void` blocks skills and specials.
    #[error("{actor} is silenced and cannot use '{name}'")]
    Silenced { actor: InstanceId, name: String },

    /// Actor or target id is not in the current roster.
    #[error("combatant {0} is not in this battle")]
    MissingParticipant(InstanceId),

    /// Intent shape does not match its kind.
    #[error("malformed intent: {0}")]
    MalformedIntent(String),

    /// Actions are only resolved while the battle is active.
    #[error("battle is not active")]
    NotActive,

    /// Only the combatant whose turn is open may act.
    #[error("it is not {actor}'s turn")]
    NotActorsTurn { actor: InstanceId },
}

impl ActionError {
    pub fn invalid_target(reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            reason: reason.into(),
        }
    }

    pub(crate) fn from_resource(actor: InstanceId, error: ResourceError) -> Self {
        match error {
            ResourceError::InsufficientResource {
                pool,
                required,
                available,
            } => Self::InsufficientResource {
                actor,
                pool,
                required,
                available,
            },
        }
    }
}

impl BattleError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        use ActionError::*;
        match self {
            InsufficientResource { .. } | UnknownSkill { .. } | InvalidTarget { .. } | Silenced { .. } => {
                ErrorSeverity::Recoverable
            }
            MissingParticipant(_) | MalformedIntent(_) | NotActive | NotActorsTurn { .. } => {
                ErrorSeverity::Validation
            }
        }
    }

    fn error_code(&self) -> &'static str {
        use ActionError::*;
        match self {
            InsufficientResource { .. } => "ACTION_INSUFFICIENT_RESOURCE",
            UnknownSkill { .. } => "ACTION_UNKNOWN_SKILL",
            InvalidTarget { .. } => "ACTION_INVALID_TARGET",
            Silenced { .. } => "ACTION_SILENCED",
            MissingParticipant(_) => "ACTION_MISSING_PARTICIPANT",
            MalformedIntent(_) => "ACTION_MALFORMED_INTENT",
            NotActive => "ACTION_NOT_ACTIVE",
            NotActorsTurn { .. } => "ACTION_NOT_ACTORS_TURN",
        }
    }

    fn log_entry(&self) -> LogEntry {
        match self.severity() {
            ErrorSeverity::Recoverable => LogEntry::system(self.to_string()),
            _ => LogEntry::error(self.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogCategory;

    #[test]
    fn local_validation_failures_are_recoverable() {
        let err = ActionError::UnknownSkill {
            actor: InstanceId::host(0),
            name: "meteor".into(),
        };
        assert!(err.severity().is_recoverable());
        assert_eq!(err.error_code(), "ACTION_UNKNOWN_SKILL");
        assert_eq!(err.log_entry().category, LogCategory::System);
    }

    #[test]
    fn missing_participant_aborts_the_action() {
        let err = ActionError::MissingParticipant(InstanceId::guest(4));
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.log_entry().category, LogCategory::Error);
        assert_eq!(err.to_string(), "combatant g4 is not in this battle");
    }

    #[test]
    fn resource_errors_keep_their_numbers() {
        let err = ActionError::from_resource(
            InstanceId::host(1),
            ResourceError::InsufficientResource {
                pool: ResourcePool::Mp,
                required: 25,
                available: 20,
            },
        );
        assert_eq!(err.to_string(), "h1 does not have enough MP (20/25)");
    }
}
