//! Launch configuration read from the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// How the demo battle is wired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// One runner plays both sides.
    Local,
    /// A host runner and a follower session over an in-memory link.
    Loopback,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Mode::Local),
            "loopback" | "networked" => Ok(Mode::Loopback),
            other => anyhow::bail!("unknown BATTLE_MODE '{}' (expected local or loopback)", other),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub mode: Mode,
    /// Character ids, in slot order.
    pub own_party: Vec<String>,
    pub opponent_party: Vec<String>,
    /// Directory holding `roster.ron` and `config.toml`. Embedded content
    /// is used when unset.
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Local,
            own_party: ids("knight,mage,cleric"),
            opponent_party: ids("berserker,rogue,warlock"),
            data_dir: None,
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_MODE` - `local` or `loopback` (default: local)
    /// - `BATTLE_OWN_PARTY` - Comma-separated character ids (default: knight,mage,cleric)
    /// - `BATTLE_OPPONENT_PARTY` - Comma-separated character ids (default: berserker,rogue,warlock)
    /// - `CONTENT_DATA_DIR` - Content directory (default: embedded content)
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(mode) = read_env::<String>("BATTLE_MODE") {
            config.mode = mode.parse()?;
        }
        if let Some(party) = read_env::<String>("BATTLE_OWN_PARTY") {
            config.own_party = ids(&party);
        }
        if let Some(party) = read_env::<String>("BATTLE_OPPONENT_PARTY") {
            config.opponent_party = ids(&party);
        }
        config.data_dir = read_env::<PathBuf>("CONTENT_DATA_DIR");

        Ok(config)
    }
}

fn ids(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .collect()
}

fn read_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.parse().ok())
}
