//! Topic-based event bus for battle events.
//!
//! Events are published to a topic and to a combined stream; consumers
//! subscribe only to what they need. Publishing never blocks and never fails:
//! events without subscribers are dropped.

mod bus;
mod types;

pub use bus::{EventBus, Topic};
pub use types::{BattleEvent, SkipReason};
