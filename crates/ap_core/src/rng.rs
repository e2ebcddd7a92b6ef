// crates/ap_core/src/rng.rs
//
// Deterministic, integer-only RNG utilities for tie-breaking.
//
// • `TiePolicy::Random` is the only consumer; `tie_seed` is the only source of
//   randomness. Every decision is logged as a `TieCrumb` with the index of the
//   RNG word that decided it, so a run can be replayed exactly.
// • Integer-only: unbiased ranges via rejection sampling, no floating point.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// A single logged tie decision.
///
/// `word_index` is **1-based**: the first 64-bit RNG word consumed by this
/// `TieRng` has index 1. With rejection sampling, it refers to the
/// **accepted** word that decided the pick.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TieCrumb {
    /// Human-readable context, e.g. "surplus:round3".
    pub ctx: String,
    /// Chosen index in the contender set (0-based).
    pub pick: usize,
    /// Number of contenders the pick was made from.
    pub of: usize,
    pub word_index: u128,
}

/// Deterministic RNG for ties.
///
/// ChaCha20 with an explicit 32-byte seed: `seed.to_le_bytes()` in the first
/// 8 bytes, the remaining 24 bytes zero.
#[derive(Debug, Clone)]
pub struct TieRng {
    rng: ChaCha20Rng,
    words_consumed: u128,
}

impl TieRng {
    #[inline]
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        Self {
            rng: ChaCha20Rng::from_seed(seed32),
            words_consumed: 0,
        }
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.words_consumed = self.words_consumed.saturating_add(1);
        self.rng.next_u64()
    }

    /// Unbiased integer in `[0, n)` plus the 1-based index of the deciding
    /// word; `None` if `n == 0`.
    ///
    /// `threshold = 2^64 mod n`; accept `x >= threshold`, then `x % n` is uniform.
    fn gen_range_with_index(&mut self, n: u64) -> Option<(u64, u128)> {
        if n == 0 {
            return None;
        }
        let threshold = n.wrapping_neg() % n;
        loop {
            let x = self.next_u64();
            if x >= threshold {
                return Some((x % n, self.words_consumed));
            }
        }
    }

    /// Pick an index in `[0, n)` and return the crumb describing the pick.
    pub fn choose_index_with_crumb(&mut self, ctx: &str, n: usize) -> Option<(usize, TieCrumb)> {
        let (v, word_index) = self.gen_range_with_index(n as u64)?;
        let pick = v as usize;
        Some((
            pick,
            TieCrumb {
                ctx: ctx.to_string(),
                pick,
                of: n,
                word_index,
            },
        ))
    }
}

impl Default for TieRng {
    fn default() -> Self {
        Self::from_seed_u64(0)
    }
}
