//! Bonus application for effective stats.
//!
//! Calculation order is fixed:
//! `Factors (multiplied together) → Flat → Clamp`
//!
//! Percentage modifiers from status effects are folded first; flat passive
//! bonuses are added afterwards, so a +10 DEF passive is never scaled by a
//! DEF buff.

/// A single modifier that can be applied to a stat value.
///
/// - **Factor**: multiplicative percentage (130 = ×1.3, 70 = ×0.7). Several
///   factors on the same stat multiply with each other.
/// - **Flat**: additive bonus applied after every factor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bonus {
    /// Multiplicative factor in percent (applied first, sequentially)
    Factor(i32),

    /// Flat additive bonus (applied after all factors)
    Flat(i32),
}

impl Bonus {
    /// Create a factor bonus (150 = ×1.5)
    pub fn factor(percent: i32) -> Self {
        Bonus::Factor(percent)
    }

    /// Create a flat bonus
    pub fn flat(value: i32) -> Self {
        Bonus::Flat(value)
    }
}

/// A collection of bonuses that will be applied in the correct order.
///
/// # Example
/// ```
/// # use battle_core::stats::bonus::{Bonus, BonusStack};
/// let mut stack = BonusStack::new();
/// stack.add(Bonus::factor(150));   // ×1.5
/// stack.add(Bonus::factor(80));    // ×0.8
/// stack.add(Bonus::flat(5));       // +5
///
/// // (40 × 1.5 × 0.8) + 5
/// assert_eq!(stack.apply(40, 0, 999), 53);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BonusStack {
    bonuses: Vec<Bonus>,
}

impl BonusStack {
    /// Create a new empty bonus stack
    pub fn new() -> Self {
        Self {
            bonuses: Vec::new(),
        }
    }

    /// Add a bonus to the stack
    pub fn add(&mut self, bonus: Bonus) {
        self.bonuses.push(bonus);
    }

    /// Add multiple bonuses at once
    pub fn extend(&mut self, bonuses: impl IntoIterator<Item = Bonus>) {
        self.bonuses.extend(bonuses);
    }

    /// Apply all bonuses to a base value with clamping
    ///
    /// # Formula
    /// ```text
    /// result = clamp(base × f1/100 × f2/100 × ... + flat_sum, min, max)
    /// ```
    ///
    /// Each factor step floors, matching integer HP arithmetic elsewhere.
    pub fn apply(&self, base: i32, min: i32, max: i32) -> i32 {
        let after_factors = self
            .bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::Factor(p) => Some(*p),
                _ => None,
            })
            .fold(base as i64, |acc, percent| acc.saturating_mul(percent as i64) / 100);

        let flat_sum: i64 = self
            .bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::Flat(v) => Some(*v as i64),
                _ => None,
            })
            .sum();

        (after_factors + flat_sum).clamp(min as i64, max as i64) as i32
    }

    /// Check if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.bonuses.is_empty()
    }

    /// Get the number of bonuses in the stack
    pub fn len(&self) -> usize {
        self.bonuses.len()
    }
}

/// Clamping bounds for a stat.
#[derive(Clone, Copy, Debug)]
pub struct StatBounds {
    pub min: i32,
    pub max: i32,
}

impl StatBounds {
    /// Offensive, defensive, speed and support stats [0, 9999]
    pub const COMBAT: Self = Self { min: 0, max: 9999 };

    /// Crit and dodge chances [0, 100]
    pub const RATE: Self = Self { min: 0, max: 100 };

    /// Critical multiplier in percent [100, 1000]
    ///
    /// A critical hit never deals less than a normal one.
    pub const MULTIPLIER: Self = Self {
        min: 100,
        max: 1000,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stack_is_identity() {
        let stack = BonusStack::new();
        assert_eq!(stack.apply(42, 0, 100), 42);
        assert!(stack.is_empty());
    }

    #[test]
    fn factors_of_same_stat_multiply() {
        let mut stack = BonusStack::new();
        stack.add(Bonus::factor(130));
        stack.add(Bonus::factor(70));
        // 100 × 1.3 = 130, × 0.7 = 91
        assert_eq!(stack.apply(100, 0, 9999), 91);
    }

    #[test]
    fn flat_applies_after_factors() {
        let mut stack = BonusStack::new();
        stack.add(Bonus::flat(10));
        stack.add(Bonus::factor(200));
        // (20 × 2) + 10, not (20 + 10) × 2
        assert_eq!(stack.apply(20, 0, 9999), 50);
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn result_is_clamped() {
        let mut stack = BonusStack::new();
        stack.add(Bonus::flat(-50));
        assert_eq!(stack.apply(10, 0, 100), 0);
        stack.add(Bonus::factor(10_000));
        assert_eq!(stack.apply(10, 0, 100), 100);
    }
}
