//! Electoral threshold filter.
//!
//! Contract:
//! - A party is eliminated iff `votes / total_votes < electoral_threshold`;
//!   a share exactly at the threshold survives.
//! - The denominator is `total_votes` (ballots cast), not the sum of party votes.
//! - A surplus pair with any eliminated member is dropped whole; the surviving
//!   partner then bids alone.
//! - Produces a fresh view; the input record is untouched.

use std::collections::BTreeMap;

use crate::{Election, PartyId, SurplusPair};

/// Parties that cleared the threshold, plus what was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualified {
    /// Canonical order of every input party.
    pub all_parties: Vec<PartyId>,
    /// Survivors, canonical order.
    pub order: Vec<PartyId>,
    pub votes: BTreeMap<PartyId, u64>,
    /// Eliminated parties, canonical order.
    pub eliminated: Vec<PartyId>,
    pub pairs: Vec<SurplusPair>,
    pub dropped_pairs: Vec<SurplusPair>,
}

impl Qualified {
    /// Sum of surviving parties' votes.
    pub fn valid_votes(&self) -> u128 {
        self.votes.values().map(|&v| v as u128).sum()
    }

    /// Position of `party` in canonical order of all input parties.
    pub fn rank_of(&self, party: &PartyId) -> usize {
        self.all_parties.iter().position(|p| p == party).unwrap_or(usize::MAX)
    }
}

/// Vote share strictly below the threshold.
///
/// Compared in `f64` on purpose: the threshold itself is a decimal fraction
/// (e.g. 0.0325) and the share is a correctly rounded division.
#[inline]
pub fn below_threshold(votes: u64, total_votes: u64, threshold: f64) -> bool {
    (votes as f64) / (total_votes as f64) < threshold
}

pub fn apply_threshold(election: &Election) -> Qualified {
    let all_parties = election.canonical_order();
    let mut order = Vec::with_capacity(all_parties.len());
    let mut votes = BTreeMap::new();
    let mut eliminated = Vec::new();

    for p in &all_parties {
        let v = election.votes_per_party.get(p).copied().unwrap_or(0);
        if below_threshold(v, election.total_votes, election.electoral_threshold) {
            eliminated.push(p.clone());
        } else {
            order.push(p.clone());
            votes.insert(p.clone(), v);
        }
    }

    let (pairs, dropped_pairs): (Vec<SurplusPair>, Vec<SurplusPair>) = election
        .surplus_pairs
        .iter()
        .cloned()
        .partition(|sp| sp.members().iter().all(|m| votes.contains_key(*m)));

    Qualified {
        all_parties,
        order,
        votes,
        eliminated,
        pairs,
        dropped_pairs,
    }
}
