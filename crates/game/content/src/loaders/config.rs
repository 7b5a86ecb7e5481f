//! Battle rule configuration loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for battle tunables from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a `BattleConfig` from a TOML file.
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        if config.damage_variance_pct > 100 {
            anyhow::bail!(
                "damage_variance_pct must be at most 100 (got {})",
                config.damage_variance_pct
            );
        }
        Ok(config)
    }
}
