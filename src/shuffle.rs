//! Seeded permutations for the shuffle test.

use std::time::{SystemTime, UNIX_EPOCH};

/// Minimal xorshift64 PRNG; reproducible from its seed.
#[derive(Debug, Clone)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Generator for trial `index` of a run seeded with `seed`.
    ///
    /// Depends only on the pair, never on which worker runs the trial.
    pub fn for_trial(seed: u64, index: u64) -> Self {
        Self::new(splitmix64(seed ^ splitmix64(index)))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform value in `0..bound`. `bound` must be non-zero.
    pub fn next_below(&mut self, bound: u64) -> u64 {
        debug_assert!(bound > 0);
        // reject the tail that would bias the modulo
        let zone = u64::MAX - (u64::MAX % bound);
        loop {
            let x = self.next_u64();
            if x < zone {
                return x % bound;
            }
        }
    }
}

/// splitmix64 finalizer; spreads nearby seeds across the state space.
pub fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed drawn from the clock, for runs without an explicit seed.
pub fn clock_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    splitmix64(nanos)
}

/// In-place Fisher-Yates shuffle; every permutation equally likely.
pub fn fisher_yates<T>(slice: &mut [T], rng: &mut Xorshift64) {
    for i in (1..slice.len()).rev() {
        let j = rng.next_below(i as u64 + 1) as usize;
        slice.swap(i, j);
    }
}
