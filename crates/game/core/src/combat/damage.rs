//! Damage arithmetic shared by attacks and skills.

/// Which attack/defense pair a hit uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DamageType {
    /// `atk` against `def`.
    #[default]
    Physical,
    /// `matk` against `mdef`.
    Magical,
}

/// Default power of a plain attack, in percent of the attack stat.
pub const BASIC_POWER: u32 = 100;

/// Unmodified damage of one hit.
///
/// # Formula
///
/// ```text
/// raw  = attack × power / 100
/// base = max(1, raw − defense)
/// ```
pub fn base_damage(attack: i32, defense: i32, power: u32) -> u32 {
    let raw = attack as i64 * power as i64 / 100;
    (raw - defense as i64).max(1) as u32
}

/// Scales by a percentage, flooring.
pub fn scale(amount: u32, percent: i64) -> u32 {
    (amount as i64 * percent / 100).max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defense_above_attack_still_deals_one() {
        assert_eq!(base_damage(45, 60, BASIC_POWER), 1);
    }

    #[test]
    fn plain_difference() {
        assert_eq!(base_damage(70, 20, BASIC_POWER), 50);
    }

    #[test]
    fn power_scales_attack_before_defense() {
        // 60 × 1.5 = 90, − 30
        assert_eq!(base_damage(60, 30, 150), 60);
    }

    #[test]
    fn scale_floors() {
        assert_eq!(scale(7, 50), 3);
        assert_eq!(scale(1, 50), 0);
        assert_eq!(scale(10, -20), 0);
    }
}
