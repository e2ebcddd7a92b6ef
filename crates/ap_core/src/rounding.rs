//! Integer-first ratio type for score comparisons.
//!
//! Every "pick the maximum" step in the engine compares quotients such as
//! `votes / (seats + 1)` or remainder fractions. Components are bounded by
//! `u64`, so cross-multiplication in `u128` is exact and never overflows.

use core::cmp::Ordering;
use core::fmt;

use crate::errors::CoreError;

/// Exact non-negative ratio `num / den` with `den > 0`.
///
/// Equality and ordering are by value (`1/2 == 2/4`).
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quotient {
    num: u64,
    den: u64,
}

impl Quotient {
    /// Construct a ratio; `den == 0` is rejected.
    pub fn new(num: u64, den: u64) -> Result<Self, CoreError> {
        if den == 0 {
            return Err(CoreError::InvalidRatio);
        }
        Ok(Self { num, den })
    }

    /// Highest-averages score for the next seat: `votes / (seats + 1)`.
    #[inline]
    pub fn next_seat_score(votes: u64, seats: u32) -> Self {
        Self { num: votes, den: seats as u64 + 1 }
    }

    pub fn num(&self) -> u64 { self.num }
    pub fn den(&self) -> u64 { self.den }
}

impl PartialEq for Quotient {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Quotient {}

impl PartialOrd for Quotient {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quotient {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = (self.num as u128) * (other.den as u128);
        let rhs = (other.num as u128) * (self.den as u128);
        lhs.cmp(&rhs)
    }
}

impl fmt::Display for Quotient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}
