//! Stat system.
//!
//! ```text
//! [ BaseStats (template, immutable) ]
//!      ↓  status-effect factors (buff/debuff/rage), multiplied together
//!      ↓  passive flat bonuses
//!      ↓  clamp
//! [ EffectiveStats (never stored, recomputed on demand) ]
//! ```

pub mod base;
pub mod bonus;
pub mod effective;

pub use base::{BaseStats, StatKind};
pub use bonus::{Bonus, BonusStack, StatBounds};
pub use effective::EffectiveStats;
