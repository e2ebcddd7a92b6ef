//! Largest remainders (Hare quota).
//!
//! Contract:
//! - Threshold and baseline as in `threshold` / `quota`; surplus pairs are
//!   ignored entirely.
//! - Each survivor gets at most one extra seat; the `surplus_seats` parties
//!   with the largest leftover fraction of a quota receive it.
//! - Ranking keys: remainder ↓, raw votes ↓, then policy (canonical order
//!   under `DeterministicOrder`).
//! - Eliminated parties are reported with 0 seats.
//!
//! The remainder in votes is `((votes * seats) mod valid_votes) / seats`;
//! only the numerator is compared since the denominator is shared.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::ties::TieBreaker;
use crate::{
    apply_threshold, baseline_seats, merge_results, validate_election, AllocError,
    AllocationMethod, Apportionment, Election, Params, PartyId, Quotient, SurplusAward,
};

/// Final seats per party (every input party present).
pub fn largest_remainders(
    election: &Election,
    params: &Params,
) -> Result<BTreeMap<PartyId, u32>, AllocError> {
    largest_remainders_detailed(election, params).map(|a| a.seats)
}

/// Largest remainders with the full audit trail.
pub fn largest_remainders_detailed(
    election: &Election,
    params: &Params,
) -> Result<Apportionment, AllocError> {
    validate_election(election, params)?;

    let q = apply_threshold(election);
    let base = baseline_seats(&q, params.parliament_size)?;

    let mut ties = TieBreaker::new(params);
    let mut working = base.seats.clone();
    let mut awarded: BTreeSet<PartyId> = BTreeSet::new();
    let mut awards = Vec::with_capacity(base.surplus_seats as usize);

    for round in 1..=base.surplus_seats {
        // One extra seat per party; never exhausted since surplus < survivors.
        if awarded.len() >= q.order.len() {
            awarded.clear();
        }
        let contenders: Vec<&PartyId> =
            q.order.iter().filter(|p| !awarded.contains(*p)).collect();

        let (recipient, rem, tie) =
            next_remainder(&contenders, &base.remainders, &q.votes, &mut ties, round)
                .ok_or(AllocError::NoQualifiedParties)?;

        let score = u64::try_from(rem)
            .map_err(|_| AllocError::VoteOverflow)
            .and_then(|r| {
                Quotient::new(r, params.parliament_size as u64).map_err(|_| AllocError::ZeroSeats)
            })?;

        *working.entry(recipient.clone()).or_insert(0) += 1;
        awarded.insert(recipient.clone());
        awards.push(SurplusAward {
            round,
            unit: recipient.to_string(),
            recipient,
            score,
            tie,
        });
    }

    let seats = merge_results(election, &q, working);
    Ok(Apportionment {
        method: AllocationMethod::LargestRemainders,
        parliament_size: params.parliament_size,
        seats,
        order: q.all_parties.clone(),
        eliminated: q.eliminated.clone(),
        dropped_pairs: Vec::new(),
        valid_votes: base.valid_votes,
        baseline: base.seats,
        surplus_seats: base.surplus_seats,
        awards,
        tie_crumbs: ties.into_crumbs(),
    })
}

/// Best remaining contender; returns (party, remainder numerator, was_tie).
///
/// `was_tie` is set when more than one contender shares the top remainder,
/// even if raw votes settled it.
fn next_remainder(
    contenders: &[&PartyId],
    remainders: &BTreeMap<PartyId, u128>,
    votes: &BTreeMap<PartyId, u64>,
    ties: &mut TieBreaker,
    round: u32,
) -> Option<(PartyId, u128, bool)> {
    let key = |p: &PartyId| {
        (
            remainders.get(p).copied().unwrap_or(0),
            votes.get(p).copied().unwrap_or(0),
        )
    };

    let top_rem = contenders.iter().map(|&p| key(p).0).max()?;
    let rem_tied = contenders.iter().filter(|&&p| key(p).0 == top_rem).count() > 1;

    let mut best: Vec<&PartyId> = Vec::new();
    let mut best_key: Option<(u128, u64)> = None;
    for &p in contenders {
        let k = key(p);
        match best_key.map(|b| k.cmp(&b)) {
            None | Some(Ordering::Greater) => {
                best_key = Some(k);
                best.clear();
                best.push(p);
            }
            Some(Ordering::Equal) => best.push(p),
            Some(Ordering::Less) => {}
        }
    }

    let pick = if best.len() > 1 {
        ties.pick(&format!("remainder:round{round}"), best.len())
    } else {
        0
    };
    best.get(pick).map(|&p| (p.clone(), top_rem, rem_tied))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SurplusPair, TiePolicy};

    fn pid(s: &str) -> PartyId {
        s.parse().unwrap()
    }

    fn election(votes: &[(&str, u64)], threshold: f64) -> Election {
        Election {
            election_id: 1,
            parties: votes.iter().map(|(p, _)| pid(p)).collect(),
            votes_per_party: votes.iter().map(|(p, v)| (pid(p), *v)).collect(),
            total_votes: votes.iter().map(|(_, v)| *v).sum(),
            surplus_pairs: vec![],
            electoral_threshold: threshold,
        }
    }

    fn seat_list(m: &BTreeMap<PartyId, u32>) -> Vec<u32> {
        m.values().copied().collect()
    }

    #[test]
    fn worked_example() {
        let e = election(&[("A", 30_000), ("B", 20_000), ("C", 5_000)], 0.0);
        let a = largest_remainders_detailed(&e, &Params::with_seats(10)).unwrap();
        assert_eq!(seat_list(&a.seats), vec![5, 4, 1]);
        // C's remainder (50000) beats B's (35000).
        assert_eq!(a.awards[0].recipient, pid("C"));
        assert_eq!(a.awards[1].recipient, pid("B"));
        assert_eq!(a.awards[0].score, Quotient::new(5000, 1).unwrap());
        assert!(a.awards.iter().all(|w| !w.tie));
    }

    #[test]
    fn surplus_pairs_are_ignored() {
        let mut e = election(&[("A", 4500), ("B", 2700), ("C", 2800)], 0.0);
        let plain = largest_remainders(&e, &Params::with_seats(10)).unwrap();
        e.surplus_pairs = vec![SurplusPair::new(pid("B"), pid("C"))];
        let paired = largest_remainders(&e, &Params::with_seats(10)).unwrap();
        assert_eq!(plain, paired);
        assert_eq!(seat_list(&plain), vec![4, 3, 3]);
    }

    #[test]
    fn equal_remainders_prefer_more_votes() {
        // Quota 2: A = 1 rem 2, B = 0 rem 2.
        let e = election(&[("B", 1), ("A", 3)], 0.0);
        let a = largest_remainders_detailed(&e, &Params::with_seats(2)).unwrap();
        assert_eq!(a.seats_of(&pid("A")), 2);
        assert_eq!(a.seats_of(&pid("B")), 0);
        assert!(a.awards[0].tie);
    }

    #[test]
    fn full_ties_follow_canonical_order() {
        let e = election(&[("C", 1), ("A", 1), ("B", 1)], 0.0);
        let a = largest_remainders_detailed(&e, &Params::with_seats(2)).unwrap();
        assert_eq!(a.seats_of(&pid("C")), 1);
        assert_eq!(a.seats_of(&pid("A")), 1);
        assert_eq!(a.seats_of(&pid("B")), 0);
        assert!(a.tie_crumbs.is_empty());
    }

    #[test]
    fn random_full_ties_are_seeded() {
        let e = election(&[("C", 1), ("A", 1), ("B", 1)], 0.0);
        let params = Params {
            parliament_size: 2,
            tie_policy: TiePolicy::Random,
            tie_seed: 99,
        };
        let a = largest_remainders_detailed(&e, &params).unwrap();
        let b = largest_remainders_detailed(&e, &params).unwrap();
        assert_eq!(a.seats, b.seats);
        assert_eq!(a.total_seats(), 2);
        assert!(a.seats.values().all(|&s| s <= 1));
        assert_eq!(a.tie_crumbs.len(), 2);
    }

    #[test]
    fn eliminated_parties_get_zero() {
        let e = election(&[("A", 600), ("B", 370), ("C", 30)], 0.05);
        let a = largest_remainders_detailed(&e, &Params::with_seats(7)).unwrap();
        assert_eq!(a.eliminated, vec![pid("C")]);
        assert_eq!(a.seats_of(&pid("C")), 0);
        assert_eq!(a.total_seats(), 7);
        assert_eq!(a.seats.len(), 3);
    }
}
