//! `rand`-backed combat randomness.
//!
//! Implements `battle_core::CombatRng` over [`StdRng`]. Only the participant
//! that resolves actions (the local runner or the networked host) owns one.

use battle_core::CombatRng;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

#[derive(Debug, Clone)]
pub struct StdCombatRng {
    inner: StdRng,
}

impl StdCombatRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is set, otherwise from entropy.
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl CombatRng for StdCombatRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_rolls() {
        let mut a = StdCombatRng::seeded(9);
        let mut b = StdCombatRng::seeded(9);
        let rolls_a: Vec<u32> = (0..32).map(|_| a.roll_d100()).collect();
        let rolls_b: Vec<u32> = (0..32).map(|_| b.roll_d100()).collect();
        assert_eq!(rolls_a, rolls_b);
    }

    #[test]
    fn d100_stays_in_range() {
        let mut rng = StdCombatRng::seeded(1);
        for _ in 0..1000 {
            let roll = rng.roll_d100();
            assert!((1..=100).contains(&roll), "roll {} out of range", roll);
        }
        assert!(!rng.chance(0));
        assert!(rng.chance(100));
    }
}
