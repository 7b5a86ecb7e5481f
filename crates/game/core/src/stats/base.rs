//! Base stats carried by every combatant.
//!
//! Base stats are copied from the character template when a party is
//! instantiated and never change during a battle. Everything that moves
//! (buffs, debuffs, passives) is folded on top of them by
//! [`super::EffectiveStats::compute`].

/// Identifies one stat, used by buffs/debuffs and passive bonuses.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::EnumIter, strum::Display,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum StatKind {
    /// Physical attack.
    Atk,
    /// Magical attack.
    Matk,
    /// Physical defense.
    Def,
    /// Magical defense.
    Mdef,
    /// Turn-order speed.
    Spd,
    /// Healing power.
    Support,
    /// Critical hit chance in percent.
    CritRate,
    /// Critical damage multiplier in percent (150 = ×1.5).
    CritMultiplier,
    /// Dodge chance in percent.
    DodgeRate,
}

impl StatKind {
    /// Chance-based stats are clamped to [0, 100].
    pub const fn is_rate(self) -> bool {
        matches!(self, StatKind::CritRate | StatKind::DodgeRate)
    }
}

/// Immutable per-character stats. Omitted fields take their defaults when
/// deserialized.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BaseStats {
    pub atk: i32,
    pub matk: i32,
    pub def: i32,
    pub mdef: i32,
    pub spd: i32,
    pub support: i32,
    pub crit_rate: i32,
    pub crit_multiplier: i32,
    pub dodge_rate: i32,
}

impl BaseStats {
    /// Read a single stat by kind.
    pub fn get(&self, stat: StatKind) -> i32 {
        match stat {
            StatKind::Atk => self.atk,
            StatKind::Matk => self.matk,
            StatKind::Def => self.def,
            StatKind::Mdef => self.mdef,
            StatKind::Spd => self.spd,
            StatKind::Support => self.support,
            StatKind::CritRate => self.crit_rate,
            StatKind::CritMultiplier => self.crit_multiplier,
            StatKind::DodgeRate => self.dodge_rate,
        }
    }

    /// Builder-style setter, mostly for tests and fixtures.
    pub fn with(mut self, stat: StatKind, value: i32) -> Self {
        let slot = match stat {
            StatKind::Atk => &mut self.atk,
            StatKind::Matk => &mut self.matk,
            StatKind::Def => &mut self.def,
            StatKind::Mdef => &mut self.mdef,
            StatKind::Spd => &mut self.spd,
            StatKind::Support => &mut self.support,
            StatKind::CritRate => &mut self.crit_rate,
            StatKind::CritMultiplier => &mut self.crit_multiplier,
            StatKind::DodgeRate => &mut self.dodge_rate,
        };
        *slot = value;
        self
    }
}

impl Default for BaseStats {
    /// A plain, unremarkable fighter: no crits, no dodges.
    fn default() -> Self {
        Self {
            atk: 10,
            matk: 10,
            def: 10,
            mdef: 10,
            spd: 10,
            support: 10,
            crit_rate: 0,
            crit_multiplier: 150,
            dodge_rate: 0,
        }
    }
}
