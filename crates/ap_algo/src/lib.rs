// crates/ap_algo/src/lib.rs
//! Apportionment engine.
//!
//! Two entry points share one front half:
//!
//! 1. `validate::validate_election`: fail fast on malformed records.
//! 2. `threshold::apply_threshold`: drop parties below the vote-share bar,
//!    and any surplus pair that lost a member.
//! 3. `quota::baseline_seats`: floor(votes / (valid_votes / seats)).
//!
//! Then `bader_ofer` distributes the leftover seats one at a time by highest
//! average over merged surplus pairs, while `largest_remainders` hands them to
//! the largest leftover fractions.
//!
//! Both take `&Election`; the record is never mutated, so one loaded record
//! can feed any number of scenario runs.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use thiserror::Error;

pub use ap_core::{
    rng::TieCrumb, AllocationMethod, Election, Params, PartyId, Quotient, SurplusPair, TiePolicy,
};

pub mod bader_ofer;
pub mod largest_remainders;
pub mod quota;
pub mod threshold;
pub mod validate;

mod ties;

pub use bader_ofer::{bader_ofer, bader_ofer_detailed, BiddingUnit};
pub use largest_remainders::{largest_remainders, largest_remainders_detailed};
pub use quota::{baseline_seats, Baseline};
pub use threshold::{apply_threshold, Qualified};
pub use validate::validate_election;

// ----------------------------- Errors -----------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocError {
    #[error("election has no parties")]
    NoParties,
    #[error("total_votes must be positive")]
    ZeroTotalVotes,
    #[error("electoral threshold {0} is outside [0, 1)")]
    ThresholdOutOfRange(f64),
    #[error("parliament size must be positive")]
    ZeroSeats,
    #[error("sum of party votes exceeds u64")]
    VoteOverflow,
    #[error("surplus pair joins {0} with itself")]
    SelfPair(PartyId),
    #[error("surplus pair references unknown party {0}")]
    UnknownPairMember(PartyId),
    #[error("party {0} appears in more than one surplus pair")]
    PartyInMultiplePairs(PartyId),
    #[error("no party passed the electoral threshold")]
    NoQualifiedParties,
}

// ----------------------------- Outcome -----------------------------

/// One surplus seat and who received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurplusAward {
    /// 1-based surplus round.
    pub round: u32,
    /// Winning bidding unit: a party name, or "A+B" for a merged pair.
    pub unit: String,
    pub recipient: PartyId,
    /// Winning score: `votes/(seats+1)` for Bader-Ofer, remainder fraction for LR.
    pub score: Quotient,
    /// True iff the award needed a tie break (at unit level or inside a pair).
    pub tie: bool,
}

/// Full audit record of one allocation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Apportionment {
    pub method: AllocationMethod,
    pub parliament_size: u32,
    /// Every party of the input record, eliminated ones at 0.
    pub seats: BTreeMap<PartyId, u32>,
    /// Canonical order of all input parties.
    pub order: Vec<PartyId>,
    pub eliminated: Vec<PartyId>,
    pub dropped_pairs: Vec<SurplusPair>,
    pub valid_votes: u128,
    /// Baseline seats of surviving parties.
    pub baseline: BTreeMap<PartyId, u32>,
    pub surplus_seats: u32,
    pub awards: Vec<SurplusAward>,
    pub tie_crumbs: Vec<TieCrumb>,
}

impl Apportionment {
    pub fn total_seats(&self) -> u32 {
        self.seats.values().sum()
    }

    pub fn seats_of(&self, party: &PartyId) -> u32 {
        self.seats.get(party).copied().unwrap_or(0)
    }

    /// Seats in canonical party order.
    pub fn ordered_seats(&self) -> Vec<(&PartyId, u32)> {
        self.order.iter().map(|p| (p, self.seats_of(p))).collect()
    }
}

/// Dispatch on `method`.
pub fn allocate(
    election: &Election,
    params: &Params,
    method: AllocationMethod,
) -> Result<Apportionment, AllocError> {
    match method {
        AllocationMethod::BaderOfer => bader_ofer_detailed(election, params),
        AllocationMethod::LargestRemainders => largest_remainders_detailed(election, params),
    }
}

/// Shared tail of both methods: survivors' seats plus zeros for everyone else.
pub(crate) fn merge_results(
    election: &Election,
    q: &Qualified,
    working: BTreeMap<PartyId, u32>,
) -> BTreeMap<PartyId, u32> {
    let mut out: BTreeMap<PartyId, u32> =
        election.votes_per_party.keys().map(|p| (p.clone(), 0)).collect();
    for (p, s) in working {
        if let Some(slot) = out.get_mut(&p) {
            *slot = s;
        }
    }
    for p in &q.eliminated {
        out.insert(p.clone(), 0);
    }
    out
}
