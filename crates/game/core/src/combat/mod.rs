//! Combat resolution.
//!
//! Pure functions over combatants: they read effective stats, draw from the
//! supplied rng and return results. Applying a result to the roster is the
//! caller's job.

pub mod damage;
pub mod event;
pub mod result;

pub use damage::{BASIC_POWER, DamageType, base_damage};
pub use event::CombatEvent;
pub use result::{AttackResult, Strike, resolve_attack};
