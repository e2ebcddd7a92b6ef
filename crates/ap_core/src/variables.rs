//! Configuration domains and the `Params` bundle.
//!
//! Parliament size is an explicit parameter rather than a global so the
//! engine can be run (and unit-tested) at any scale.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Seats in the Knesset; the default legislature size.
pub const DEFAULT_PARLIAMENT_SIZE: u32 = 120;

/// Surplus-seat distribution rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AllocationMethod {
    /// Highest averages with pairwise surplus agreements.
    BaderOfer,
    /// Hare quota, leftover seats by largest remainder; pairs ignored.
    LargestRemainders,
}

impl AllocationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationMethod::BaderOfer => "bader_ofer",
            AllocationMethod::LargestRemainders => "largest_remainders",
        }
    }
}

impl fmt::Display for AllocationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllocationMethod {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "bader_ofer" | "dhondt" => Ok(AllocationMethod::BaderOfer),
            "largest_remainders" | "largest_remainder" | "lr" | "hare" => {
                Ok(AllocationMethod::LargestRemainders)
            }
            _ => Err(CoreError::UnknownMethod),
        }
    }
}

/// How exact ties between contenders are resolved.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TiePolicy {
    /// Earliest contender in the election's canonical party order wins.
    #[default]
    DeterministicOrder,
    /// Seeded draw from `Params::tie_seed`.
    Random,
}

impl TiePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TiePolicy::DeterministicOrder => "deterministic_order",
            TiePolicy::Random => "random",
        }
    }
}

impl fmt::Display for TiePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TiePolicy {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "deterministic_order" | "deterministic" | "order" => Ok(TiePolicy::DeterministicOrder),
            "random" => Ok(TiePolicy::Random),
            _ => Err(CoreError::UnknownTiePolicy),
        }
    }
}

/// Engine parameters shared by both allocation methods.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Params {
    pub parliament_size: u32,
    pub tie_policy: TiePolicy,
    /// Only consulted when `tie_policy == Random`.
    pub tie_seed: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            parliament_size: DEFAULT_PARLIAMENT_SIZE,
            tie_policy: TiePolicy::DeterministicOrder,
            tie_seed: 0,
        }
    }
}

impl Params {
    pub fn with_seats(parliament_size: u32) -> Self {
        Self { parliament_size, ..Self::default() }
    }

    pub fn validate_domains(&self) -> Result<(), CoreError> {
        if self.parliament_size == 0 {
            return Err(CoreError::DomainOutOfRange("parliament_size"));
        }
        Ok(())
    }
}
