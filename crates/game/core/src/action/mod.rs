//! Action domain: declared intents, skills and their resolution.
//!
//! # Module Structure
//!
//! - `intent`: what a participant declares (`ActionIntent`)
//! - `skill`: skill data (cost, scope, routine key)
//! - `targeting`: scope validation, taunt redirects, lazy "all" expansion
//! - `routine`: `SkillEffect` implementations and the `SkillRegistry`
//! - `resolver`: transactional execution of one intent
//! - `error`: `ActionError`

pub mod error;
pub mod intent;
pub mod resolver;
pub mod routine;
pub mod skill;
pub mod targeting;

pub use error::ActionError;
pub use intent::{ActionIntent, ActionKind};
pub use resolver::{ActionReport, DEFEND_MAGNITUDE, resolve_action};
pub use routine::{EffectContext, SkillEffect, SkillRegistry};
pub use skill::{Skill, SkillRoutine, StatusSpec, TargetScope};
pub use targeting::{TargetSet, Targeting, resolve_targets};
