//! Content factory for loading battle data from a directory.

use std::path::{Path, PathBuf};

use battle_core::BattleConfig;

use crate::loaders::{ConfigLoader, LoadResult, Roster, RosterLoader};

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── roster.ron
/// ```
///
/// Missing files fall back to the content compiled into the crate.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load battle tunables from `config.toml`.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(BattleConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the character roster from `roster.ron`.
    pub fn load_roster(&self) -> LoadResult<Roster> {
        let path = self.data_dir.join("roster.ron");
        if !path.exists() {
            return RosterLoader::load_embedded();
        }
        RosterLoader::load(&path)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
