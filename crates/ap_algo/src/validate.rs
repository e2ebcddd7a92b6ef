//! Fail-fast structural checks on an `Election` + `Params`.
//!
//! The allocation methods call this first; callers may also call it directly
//! to reject a record before running any scenario.

use std::collections::BTreeSet;

use crate::{AllocError, Election, Params, PartyId};

pub fn validate_election(election: &Election, params: &Params) -> Result<(), AllocError> {
    params.validate_domains().map_err(|_| AllocError::ZeroSeats)?;

    if election.votes_per_party.is_empty() {
        return Err(AllocError::NoParties);
    }
    if election.total_votes == 0 {
        return Err(AllocError::ZeroTotalVotes);
    }
    let t = election.electoral_threshold;
    if !t.is_finite() || !(0.0..1.0).contains(&t) {
        return Err(AllocError::ThresholdOutOfRange(t));
    }
    if election.attributed_votes() > u64::MAX as u128 {
        return Err(AllocError::VoteOverflow);
    }

    let mut paired: BTreeSet<&PartyId> = BTreeSet::new();
    for sp in &election.surplus_pairs {
        if sp.first() == sp.second() {
            return Err(AllocError::SelfPair(sp.first().clone()));
        }
        for m in sp.members() {
            if !election.votes_per_party.contains_key(m) {
                return Err(AllocError::UnknownPairMember(m.clone()));
            }
            if !paired.insert(m) {
                return Err(AllocError::PartyInMultiplePairs(m.clone()));
            }
        }
    }
    Ok(())
}
