//! Deterministic seeded RNG for the Almanac engine.
//!
//! A 32-bit mulberry32 generator with float/int/dice/choice primitives and
//! explicit state save/restore. The same seed produces a bit-identical
//! sequence on every host, which is what lets chain events be replayed,
//! checkpointed, and pinned by golden-master fixtures.

/// Dice notation parsing and rolling (`NdM`, `NdM+K`, `NdM-K`).
pub mod dice;
/// Error types for the RNG crate.
pub mod error;

pub use dice::DiceRoll;
pub use error::{RngError, RngResult};

/// The per-step additive constant of the mulberry32 generator.
const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;

/// A deterministic 32-bit pseudo-random generator (mulberry32).
///
/// State advances by a fixed additive constant and the result is
/// avalanche-mixed through XOR/shift/multiply steps. Period 2^32.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    /// Create a generator from a seed. Equal seeds yield equal sequences.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Resume a generator from a previously captured internal state.
    ///
    /// `SeededRng::from_state(rng.state())` continues exactly where `rng`
    /// left off.
    pub fn from_state(state: u32) -> Self {
        Self { state }
    }

    /// The current internal state, suitable for [`SeededRng::from_state`].
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Replace the internal state, restarting the sequence from `value`.
    pub fn reseed(&mut self, value: u32) {
        self.state = value;
    }

    /// Advance the generator and return the next raw 32-bit word.
    fn next_word(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// The next value in `[0, 1)`.
    pub fn random_float(&mut self) -> f64 {
        f64::from(self.next_word()) / 4_294_967_296.0
    }

    /// A uniformly distributed integer in `[min, max]` (inclusive).
    ///
    /// Returns `min` when the range is empty (`max < min`).
    pub fn random_int(&mut self, min: i64, max: i64) -> i64 {
        if max < min {
            return min;
        }
        let span = (max - min + 1) as f64;
        min + (self.random_float() * span).floor() as i64
    }

    /// A percentile roll in `[1, 100]`.
    pub fn roll_percentile(&mut self) -> i64 {
        self.random_int(1, 100)
    }

    /// `true` with probability `pct` percent.
    pub fn chance(&mut self, pct: f64) -> bool {
        self.random_float() * 100.0 < pct
    }

    /// Pick a uniformly random element of `items`.
    ///
    /// # Errors
    ///
    /// Returns [`RngError::EmptyCollection`] when `items` is empty.
    pub fn random_choice<'a, T>(&mut self, items: &'a [T]) -> RngResult<&'a T> {
        if items.is_empty() {
            return Err(RngError::EmptyCollection);
        }
        let index = self.random_int(0, items.len() as i64 - 1) as usize;
        Ok(&items[index])
    }

    /// Pick an element of `items` with probability proportional to its weight.
    ///
    /// Consumes exactly one draw: the pick is the first cumulative-weight
    /// bucket exceeding `random_float() * total_weight`.
    ///
    /// # Errors
    ///
    /// Returns an error when `items` is empty, the slice lengths differ,
    /// any weight is negative or non-finite, or the total weight is zero.
    pub fn weighted_choice<'a, T>(&mut self, items: &'a [T], weights: &[f64]) -> RngResult<&'a T> {
        if items.is_empty() {
            return Err(RngError::EmptyCollection);
        }
        if items.len() != weights.len() {
            return Err(RngError::WeightMismatch {
                items: items.len(),
                weights: weights.len(),
            });
        }
        let mut total = 0.0;
        for &w in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(RngError::InvalidWeight(w));
            }
            total += w;
        }
        if total <= 0.0 {
            return Err(RngError::ZeroTotalWeight);
        }

        let draw = self.random_float() * total;
        let mut cumulative = 0.0;
        for (item, &w) in items.iter().zip(weights) {
            cumulative += w;
            if draw < cumulative {
                return Ok(item);
            }
        }
        // Floating-point accumulation can leave the draw at the boundary.
        Ok(items.last().expect("items is non-empty"))
    }
}

impl rand::RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        self.next_word()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.next_word());
        let hi = u64::from(self.next_word());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let word = self.next_word().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }
}
