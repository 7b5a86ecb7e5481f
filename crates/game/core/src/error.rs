//! Shared error taxonomy for battle-core.
//!
//! Concrete errors (`ActionError`, `ResourceError`) live beside the operations
//! they guard. The runtime only looks at [`ErrorSeverity`] to decide whether a
//! rejected turn is offered again.

use crate::log::LogEntry;

/// How the round loop reacts to a rejected action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The actor may choose again: not enough MP, unknown skill, silenced.
    Recoverable,

    /// The intent itself is broken (missing combatant, wrong actor). The
    /// action is aborted and the turn is spent.
    Validation,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Implemented by every rule error surfaced to the runtime.
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier for logs and metrics.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    /// The line shown to both participants when the action is rejected.
    fn log_entry(&self) -> LogEntry {
        LogEntry::error(self.to_string())
    }
}
