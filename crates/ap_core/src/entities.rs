//! Election record and surplus-sharing agreements.
//!
//! `Election` is the single input the engine consumes. The engine only ever
//! borrows it; scenario overrides are applied to clones.

use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::PartyId;

/// Two parties pooling surplus votes. Order inside the pair is informational;
/// on the wire it is a two-element array `["A", "B"]`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurplusPair(pub PartyId, pub PartyId);

impl SurplusPair {
    pub fn new(first: PartyId, second: PartyId) -> Self {
        Self(first, second)
    }

    pub fn first(&self) -> &PartyId { &self.0 }
    pub fn second(&self) -> &PartyId { &self.1 }

    pub fn members(&self) -> [&PartyId; 2] {
        [&self.0, &self.1]
    }

    pub fn contains(&self, party: &PartyId) -> bool {
        self.0 == *party || self.1 == *party
    }

    /// The other member, or `None` if `party` is not in this pair.
    pub fn partner_of(&self, party: &PartyId) -> Option<&PartyId> {
        if self.0 == *party {
            Some(&self.1)
        } else if self.1 == *party {
            Some(&self.0)
        } else {
            None
        }
    }

    /// "A+B", used in logs and award records.
    pub fn label(&self) -> String {
        format!("{}+{}", self.0, self.1)
    }
}

/// One national election as supplied by the loader.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Election {
    pub election_id: u32,
    /// Display/tie-break order. May be incomplete; see [`Election::canonical_order`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub parties: Vec<PartyId>,
    pub votes_per_party: BTreeMap<PartyId, u64>,
    /// Ballots cast, including ballots not attributed to any listed party.
    pub total_votes: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub surplus_pairs: Vec<SurplusPair>,
    /// Vote-share fraction in `[0, 1)`.
    pub electoral_threshold: f64,
}

impl Election {
    /// Parties in deterministic order: `parties` entries that have a vote
    /// count (first occurrence wins), then any remaining vote keys ascending.
    pub fn canonical_order(&self) -> Vec<PartyId> {
        let mut seen: BTreeSet<&PartyId> = BTreeSet::new();
        let mut out = Vec::with_capacity(self.votes_per_party.len());
        for p in &self.parties {
            if self.votes_per_party.contains_key(p) && seen.insert(p) {
                out.push(p.clone());
            }
        }
        for p in self.votes_per_party.keys() {
            if seen.insert(p) {
                out.push(p.clone());
            }
        }
        out
    }

    /// Sum of party vote counts (may be below `total_votes`).
    pub fn attributed_votes(&self) -> u128 {
        self.votes_per_party.values().map(|&v| v as u128).sum()
    }
}
