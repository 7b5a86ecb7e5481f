//! Runtime configuration.

use std::env;
use std::time::Duration;

use battle_core::BattleConfig;

/// Runtime configuration shared by the round loop and the sync drivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub battle: BattleConfig,
    pub event_buffer_size: usize,
    /// Cosmetic pause after each action. Not a correctness boundary.
    pub action_delay: Duration,
    /// How long the host waits for a remote intent before the remote side
    /// forfeits. `None` waits indefinitely.
    pub remote_action_timeout: Option<Duration>,
    /// Re-prompts after recoverable rejections before the turn is lost.
    pub max_action_retries: u32,
    pub rng_seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            event_buffer_size: 256,
            action_delay: Duration::ZERO,
            remote_action_timeout: None,
            max_action_retries: 3,
            rng_seed: None,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_EVENT_BUFFER` - Event bus capacity per topic (default: 256)
    /// - `BATTLE_ACTION_DELAY_MS` - Pause after each action (default: 0)
    /// - `BATTLE_REMOTE_TIMEOUT_MS` - Remote intent timeout, 0 disables (default: 0)
    /// - `BATTLE_MAX_RETRIES` - Re-prompts after a rejected action (default: 3)
    /// - `BATTLE_SEED` - Fixed rng seed (default: entropy)
    /// - `BATTLE_DAMAGE_VARIANCE_PCT` - Damage variance in percent (default: 0)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).and_then(|value| value.trim().parse::<u64>().ok());
        let mut config = Self::default();

        if let Some(capacity) = read("BATTLE_EVENT_BUFFER") {
            config.event_buffer_size = (capacity as usize).max(1);
        }
        if let Some(ms) = read("BATTLE_ACTION_DELAY_MS") {
            config.action_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = read("BATTLE_REMOTE_TIMEOUT_MS") {
            config.remote_action_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(retries) = read("BATTLE_MAX_RETRIES") {
            config.max_action_retries = retries.min(u32::MAX as u64) as u32;
        }
        if let Some(seed) = read("BATTLE_SEED") {
            config.rng_seed = Some(seed);
        }
        if let Some(pct) = read("BATTLE_DAMAGE_VARIANCE_PCT") {
            config.battle = config.battle.with_damage_variance(pct.min(100) as u32);
        }

        config
    }
}
