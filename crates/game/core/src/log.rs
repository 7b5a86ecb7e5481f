//! Battle log lines.
//!
//! The core never writes to a logger. Every user-visible message (damage
//! dealt, rejected actions, expired effects) is returned as a [`LogEntry`]
//! and the runtime decides whether to print it, trace it, or relay it to the
//! remote peer as a `log_message`.

use core::fmt;

/// Category attached to a log line, used for colouring and filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LogCategory {
    Action,
    Damage,
    Heal,
    Status,
    System,
    Error,
}

/// A single battle log line.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub text: String,
    pub category: LogCategory,
}

impl LogEntry {
    pub fn new(category: LogCategory, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }

    pub fn action(text: impl Into<String>) -> Self {
        Self::new(LogCategory::Action, text)
    }

    pub fn damage(text: impl Into<String>) -> Self {
        Self::new(LogCategory::Damage, text)
    }

    pub fn heal(text: impl Into<String>) -> Self {
        Self::new(LogCategory::Heal, text)
    }

    pub fn status(text: impl Into<String>) -> Self {
        Self::new(LogCategory::Status, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(LogCategory::System, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(LogCategory::Error, text)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
