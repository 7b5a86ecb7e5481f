//! Data-driven content definitions and loaders.
//!
//! This crate houses the static battle content and the loaders that read it:
//! - Character rosters (data-driven via RON)
//! - Battle rule tunables (data-driven via TOML)
//!
//! Content is read once when a battle is set up. Templates are deep-copied
//! into combatants, so nothing a battle does leaks back into the roster.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult, Roster, RosterLoader};
