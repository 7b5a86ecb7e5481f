/// Battle rules configuration: compile-time capacities and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConfig {
    /// Rounds a `defending` stance lasts once declared.
    pub defend_duration: i32,
    /// Symmetric damage variance in percent applied after all modifiers (0 disables it).
    pub damage_variance_pct: u32,
    /// Share of dealt damage a drain routine returns to the caster, in percent.
    pub drain_ratio_pct: u32,
    /// Healing a cursed combatant still receives, in percent.
    pub curse_heal_pct: u32,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_PARTY_SIZE: usize = 6;
    pub const MAX_STATUS_EFFECTS: usize = 16;
    pub const MAX_SKILLS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_DEFEND_DURATION: i32 = 1;
    pub const DEFAULT_DRAIN_RATIO_PCT: u32 = 50;
    pub const DEFAULT_CURSE_HEAL_PCT: u32 = 50;

    pub fn new() -> Self {
        Self {
            defend_duration: Self::DEFAULT_DEFEND_DURATION,
            damage_variance_pct: 0,
            drain_ratio_pct: Self::DEFAULT_DRAIN_RATIO_PCT,
            curse_heal_pct: Self::DEFAULT_CURSE_HEAL_PCT,
        }
    }

    /// Enables symmetric damage variance (e.g. `10` = ±10%).
    pub fn with_damage_variance(mut self, pct: u32) -> Self {
        self.damage_variance_pct = pct.min(100);
        self
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
