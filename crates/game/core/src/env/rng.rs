//! Randomness source for combat rolls.
//!
//! Critical hits, dodges, damage variance and speed tie-breaks all draw from a
//! single [`CombatRng`] owned by whichever participant is authoritative. The
//! follower of a networked match never holds one.
//!
//! # Determinism
//!
//! Every percentage check draws, whether or not the rate is zero, so a seeded
//! generator replays the same match draw for draw. Bounded draws reject the
//! few raw values above the largest multiple of the bound, so a check may
//! occasionally consume a second draw.

/// Source of uniform draws for combat resolution.
pub trait CombatRng: Send {
    /// Generate the next uniformly distributed u32.
    fn next_u32(&mut self) -> u32;

    /// Roll a d100 (1-100 inclusive).
    fn roll_d100(&mut self) -> u32 {
        self.below(100) + 1
    }

    /// Percentage check: succeeds when a d100 roll is at most `percent`.
    ///
    /// A rate of 0 never succeeds and a rate of 100 always does.
    fn chance(&mut self, percent: u32) -> bool {
        self.roll_d100() <= percent
    }

    /// Uniform integer in `[0, bound)`. Returns 0 when `bound` is 0.
    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        let bound = u64::from(bound);
        let zone = (1u64 << 32) - (1u64 << 32) % bound;
        loop {
            let draw = u64::from(self.next_u32());
            if draw < zone {
                return (draw % bound) as u32;
            }
        }
    }

    /// Generate a value in range [min, max] inclusive.
    fn range(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        let span = (max - min) as u32 + 1;
        min + self.below(span) as i32
    }
}

impl<R: CombatRng + ?Sized> CombatRng for &mut R {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }
}

impl<R: CombatRng + ?Sized> CombatRng for Box<R> {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }
}

/// Shuffle a slice in place (Fisher-Yates).
pub fn shuffle<T>(items: &mut [T], rng: &mut (impl CombatRng + ?Sized)) {
    for i in (1..items.len()).rev() {
        let j = rng.below(i as u32 + 1) as usize;
        items.swap(i, j);
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
///
/// Used when a match needs to be reproducible from a seed: replays, tests,
/// and hosts configured with a fixed seed.
#[derive(Clone, Copy, Debug)]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    pub fn seeded(seed: u64) -> Self {
        Self {
            state: Self::pcg_step(seed ^ 0x9e3779b97f4a7c15),
        }
    }

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl CombatRng for PcgRng {
    fn next_u32(&mut self) -> u32 {
        self.state = Self::pcg_step(self.state);
        Self::pcg_output(self.state)
    }
}

/// Replays a fixed list of raw draws, cycling when exhausted.
///
/// Intended for tests: `SequenceRng::constant(99)` makes every d100 roll a
/// 100, so no crit or dodge below 100% ever lands.
#[derive(Clone, Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    cursor: usize,
}

impl SequenceRng {
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        let mut values = values.into();
        if values.is_empty() {
            values.push(0);
        }
        Self { values, cursor: 0 }
    }

    pub fn constant(value: u32) -> Self {
        Self::new(vec![value])
    }

    /// Builds a sequence whose d100 rolls come out exactly as given (1-100).
    pub fn d100(rolls: &[u32]) -> Self {
        Self::new(
            rolls
                .iter()
                .map(|&roll| roll.clamp(1, 100) - 1)
                .collect::<Vec<_>>(),
        )
    }

    /// Number of draws consumed so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl CombatRng for SequenceRng {
    fn next_u32(&mut self) -> u32 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
