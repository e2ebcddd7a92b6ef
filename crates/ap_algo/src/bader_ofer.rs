//! Bader-Ofer: Hare-quota baseline, then highest averages over surplus pairs.
//!
//! Contract:
//! - Threshold and baseline as in `threshold` / `quota`.
//! - Each surplus seat goes, one at a time, to the bidding unit with the
//!   highest `unit_votes / (unit_seats + 1)`. A surviving surplus pair bids as
//!   one unit with summed votes and summed current seats.
//! - A seat won by a pair goes to the member with the higher individual
//!   `votes / (seats + 1)` at that moment.
//! - Eliminated parties are reported with 0 seats.
//!
//! Ties:
//! - Between units: policy. Under `DeterministicOrder` the first unit in
//!   bidding order wins: unpaired parties in canonical order, then pairs in
//!   agreement order. A pair therefore loses a level score to any single.
//! - Inside a pair: more raw votes wins; if still level, policy (earlier
//!   member under `DeterministicOrder`).
//!
//! Determinism:
//! - Units are built and scanned in bidding order (see `bidding_units`).
//! - All comparisons are exact (`Quotient`, u128 cross-multiplication).

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::ties::TieBreaker;
use crate::{
    apply_threshold, baseline_seats, merge_results, validate_election, AllocError,
    AllocationMethod, Apportionment, Election, Params, PartyId, Qualified, Quotient,
    SurplusAward,
};

/// A contender for surplus seats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BiddingUnit {
    Single(PartyId),
    /// Members in canonical order.
    Pair(PartyId, PartyId),
}

impl BiddingUnit {
    pub fn members(&self) -> Vec<&PartyId> {
        match self {
            BiddingUnit::Single(p) => vec![p],
            BiddingUnit::Pair(a, b) => vec![a, b],
        }
    }

    /// "A" for a single party, "A+B" for a pair.
    pub fn label(&self) -> String {
        match self {
            BiddingUnit::Single(p) => p.to_string(),
            BiddingUnit::Pair(a, b) => format!("{a}+{b}"),
        }
    }

    pub fn votes(&self, votes: &BTreeMap<PartyId, u64>) -> Result<u64, AllocError> {
        self.members().into_iter().try_fold(0u64, |acc, p| {
            acc.checked_add(votes.get(p).copied().unwrap_or(0))
                .ok_or(AllocError::VoteOverflow)
        })
    }

    pub fn seats(&self, seats: &BTreeMap<PartyId, u32>) -> u32 {
        self.members()
            .into_iter()
            .map(|p| seats.get(p).copied().unwrap_or(0))
            .sum()
    }

    /// `unit_votes / (unit_seats + 1)`.
    pub fn score(
        &self,
        votes: &BTreeMap<PartyId, u64>,
        seats: &BTreeMap<PartyId, u32>,
    ) -> Result<Quotient, AllocError> {
        Ok(Quotient::next_seat_score(self.votes(votes)?, self.seats(seats)))
    }
}

/// Bidding units of the survivors: unpaired parties in canonical order, then
/// surviving pairs in agreement order (members in canonical order).
pub fn bidding_units(q: &Qualified) -> Vec<BiddingUnit> {
    let mut units: Vec<BiddingUnit> = q
        .order
        .iter()
        .filter(|p| !q.pairs.iter().any(|sp| sp.contains(p)))
        .map(|p| BiddingUnit::Single(p.clone()))
        .collect();
    units.extend(q.pairs.iter().map(|sp| {
        let (a, b) = (sp.first(), sp.second());
        if q.rank_of(a) <= q.rank_of(b) {
            BiddingUnit::Pair(a.clone(), b.clone())
        } else {
            BiddingUnit::Pair(b.clone(), a.clone())
        }
    }));
    units
}

/// Final seats per party (every input party present).
pub fn bader_ofer(
    election: &Election,
    params: &Params,
) -> Result<BTreeMap<PartyId, u32>, AllocError> {
    bader_ofer_detailed(election, params).map(|a| a.seats)
}

/// Bader-Ofer with the full audit trail.
pub fn bader_ofer_detailed(
    election: &Election,
    params: &Params,
) -> Result<Apportionment, AllocError> {
    validate_election(election, params)?;

    let q = apply_threshold(election);
    let base = baseline_seats(&q, params.parliament_size)?;
    let units = bidding_units(&q);
    if units.is_empty() {
        return Err(AllocError::NoQualifiedParties);
    }

    let mut ties = TieBreaker::new(params);
    let mut working = base.seats.clone();
    let mut awards = Vec::with_capacity(base.surplus_seats as usize);

    for round in 1..=base.surplus_seats {
        let (unit_idx, score, unit_tie) =
            next_unit(&units, &q.votes, &working, &mut ties, round)?;
        let unit = &units[unit_idx];

        let (recipient, pair_tie) = match unit {
            BiddingUnit::Single(p) => (p.clone(), false),
            BiddingUnit::Pair(a, b) => resolve_pair(a, b, &q.votes, &working, &mut ties, round),
        };
        *working.entry(recipient.clone()).or_insert(0) += 1;

        awards.push(SurplusAward {
            round,
            unit: unit.label(),
            recipient,
            score,
            tie: unit_tie || pair_tie,
        });
    }

    let seats = merge_results(election, &q, working);
    Ok(Apportionment {
        method: AllocationMethod::BaderOfer,
        parliament_size: params.parliament_size,
        seats,
        order: q.all_parties.clone(),
        eliminated: q.eliminated.clone(),
        dropped_pairs: q.dropped_pairs.clone(),
        valid_votes: base.valid_votes,
        baseline: base.seats,
        surplus_seats: base.surplus_seats,
        awards,
        tie_crumbs: ties.into_crumbs(),
    })
}

/// Argmax of unit scores; returns (index, winning score, was_tie).
fn next_unit(
    units: &[BiddingUnit],
    votes: &BTreeMap<PartyId, u64>,
    seats: &BTreeMap<PartyId, u32>,
    ties: &mut TieBreaker,
    round: u32,
) -> Result<(usize, Quotient, bool), AllocError> {
    let mut best: Vec<usize> = Vec::new();
    let mut best_score: Option<Quotient> = None;

    for (i, u) in units.iter().enumerate() {
        let s = u.score(votes, seats)?;
        match best_score.map(|b| s.cmp(&b)) {
            None | Some(Ordering::Greater) => {
                best_score = Some(s);
                best.clear();
                best.push(i);
            }
            Some(Ordering::Equal) => best.push(i),
            Some(Ordering::Less) => {}
        }
    }

    let score = best_score.ok_or(AllocError::NoQualifiedParties)?;
    if best.len() == 1 {
        return Ok((best[0], score, false));
    }
    let pick = ties.pick(&format!("surplus:round{round}"), best.len());
    Ok((best[pick], score, true))
}

/// Split a seat won by a pair; returns (recipient, was_tie).
fn resolve_pair(
    a: &PartyId,
    b: &PartyId,
    votes: &BTreeMap<PartyId, u64>,
    seats: &BTreeMap<PartyId, u32>,
    ties: &mut TieBreaker,
    round: u32,
) -> (PartyId, bool) {
    let va = votes.get(a).copied().unwrap_or(0);
    let vb = votes.get(b).copied().unwrap_or(0);
    let sa = Quotient::next_seat_score(va, seats.get(a).copied().unwrap_or(0));
    let sb = Quotient::next_seat_score(vb, seats.get(b).copied().unwrap_or(0));

    match sa.cmp(&sb) {
        Ordering::Greater => (a.clone(), false),
        Ordering::Less => (b.clone(), false),
        Ordering::Equal => match va.cmp(&vb) {
            Ordering::Greater => (a.clone(), true),
            Ordering::Less => (b.clone(), true),
            Ordering::Equal => {
                let pick = ties.pick(&format!("pair:{a}+{b}:round{round}"), 2);
                (if pick == 0 { a.clone() } else { b.clone() }, true)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SurplusPair, TiePolicy};

    fn pid(s: &str) -> PartyId {
        s.parse().unwrap()
    }

    fn election(votes: &[(&str, u64)], pairs: &[(&str, &str)], threshold: f64) -> Election {
        Election {
            election_id: 1,
            parties: votes.iter().map(|(p, _)| pid(p)).collect(),
            votes_per_party: votes.iter().map(|(p, v)| (pid(p), *v)).collect(),
            total_votes: votes.iter().map(|(_, v)| *v).sum(),
            surplus_pairs: pairs
                .iter()
                .map(|(a, b)| SurplusPair::new(pid(a), pid(b)))
                .collect(),
            electoral_threshold: threshold,
        }
    }

    fn seats(m: &BTreeMap<PartyId, u32>) -> Vec<(String, u32)> {
        m.iter().map(|(p, s)| (p.to_string(), *s)).collect()
    }

    fn expect(list: &[(&str, u32)]) -> Vec<(String, u32)> {
        list.iter().map(|(p, s)| (p.to_string(), *s)).collect()
    }

    #[test]
    fn worked_example_without_pairs() {
        let e = election(&[("A", 30_000), ("B", 20_000), ("C", 5_000)], &[], 0.0);
        let a = bader_ofer_detailed(&e, &Params::with_seats(10)).unwrap();

        assert_eq!(seats(&a.seats), expect(&[("A", 6), ("B", 4), ("C", 0)]));
        assert_eq!(a.total_seats(), 10);
        assert_eq!(a.surplus_seats, 2);

        // Round 1: 30000/6 = 20000/4 = 5000/1, canonical order picks A.
        assert_eq!(a.awards[0].recipient, pid("A"));
        assert!(a.awards[0].tie);
        assert_eq!(a.awards[0].score, Quotient::new(5000, 1).unwrap());
        // Round 2: B and C level at 5000, B is earlier.
        assert_eq!(a.awards[1].recipient, pid("B"));
        assert!(a.awards[1].tie);
        assert!(a.tie_crumbs.is_empty());
    }

    #[test]
    fn pair_pools_votes_and_splits_by_individual_score() {
        let votes = [("A", 4500), ("B", 2700), ("C", 2800)];

        let solo = bader_ofer(&election(&votes, &[], 0.0), &Params::with_seats(10)).unwrap();
        assert_eq!(seats(&solo), expect(&[("A", 5), ("B", 2), ("C", 3)]));

        let e = election(&votes, &[("B", "C")], 0.0);
        let a = bader_ofer_detailed(&e, &Params::with_seats(10)).unwrap();
        assert_eq!(seats(&a.seats), expect(&[("A", 4), ("B", 3), ("C", 3)]));
        assert_eq!(a.awards[0].unit, "B+C");
        assert_eq!(a.awards[0].recipient, pid("C"));
        assert_eq!(a.awards[1].recipient, pid("B"));
        assert!(a.awards.iter().all(|w| !w.tie));
    }

    #[test]
    fn internal_tie_goes_to_member_with_more_votes() {
        // Quota 1100: A=7, B=1, C=0, two surplus seats.
        // Round 1: pair 3000/2 beats A 8000/8; inside, B 2000/2 == C 1000/1.
        // Round 2: A 8000/8 == pair 3000/3, A comes first.
        let e = election(&[("A", 8000), ("B", 2000), ("C", 1000)], &[("C", "B")], 0.0);
        let a = bader_ofer_detailed(&e, &Params::with_seats(10)).unwrap();

        assert_eq!(a.awards[0].unit, "B+C");
        assert_eq!(a.awards[0].recipient, pid("B"));
        assert!(a.awards[0].tie);
        assert_eq!(a.awards[1].recipient, pid("A"));
        assert_eq!(seats(&a.seats), expect(&[("A", 8), ("B", 2), ("C", 0)]));
    }

    #[test]
    fn pair_with_eliminated_member_is_dropped() {
        let e = election(
            &[("A", 5000), ("B", 3000), ("C", 1800), ("D", 200)],
            &[("B", "D")],
            0.05,
        );
        let a = bader_ofer_detailed(&e, &Params::with_seats(12)).unwrap();
        assert_eq!(a.eliminated, vec![pid("D")]);
        assert_eq!(a.dropped_pairs, vec![SurplusPair::new(pid("B"), pid("D"))]);
        assert_eq!(a.seats_of(&pid("D")), 0);
        assert_eq!(a.total_seats(), 12);
        assert!(a.awards.iter().all(|w| !w.unit.contains('+')));
        // every input key is reported
        assert_eq!(a.seats.len(), 4);
    }

    #[test]
    fn singles_bid_before_pairs() {
        let e = election(
            &[("Z", 10), ("A", 10), ("M", 10), ("B", 10), ("Q", 10), ("R", 10)],
            &[("R", "Q"), ("B", "Z")],
            0.0,
        );
        let q = apply_threshold(&e);
        assert_eq!(
            bidding_units(&q),
            vec![
                BiddingUnit::Single(pid("A")),
                BiddingUnit::Single(pid("M")),
                BiddingUnit::Pair(pid("Q"), pid("R")),
                BiddingUnit::Pair(pid("Z"), pid("B")),
            ]
        );
    }

    #[test]
    fn level_single_beats_pair() {
        // Quota 1200: nobody reaches a full seat. Z 600/1 == X+Y 600/1.
        let e = election(&[("X", 300), ("Y", 300), ("Z", 600)], &[("X", "Y")], 0.0);
        let a = bader_ofer_detailed(&e, &Params::with_seats(1)).unwrap();
        assert_eq!(seats(&a.seats), expect(&[("X", 0), ("Y", 0), ("Z", 1)]));
        assert_eq!(a.awards[0].unit, "Z");
        assert!(a.awards[0].tie);
    }

    #[test]
    fn random_policy_is_reproducible_and_logged() {
        let e = election(&[("A", 30_000), ("B", 20_000), ("C", 5_000)], &[], 0.0);
        let params = Params {
            parliament_size: 10,
            tie_policy: TiePolicy::Random,
            tie_seed: 0xC0FFEE,
        };
        let first = bader_ofer_detailed(&e, &params).unwrap();
        let again = bader_ofer_detailed(&e, &params).unwrap();
        assert_eq!(first, again);
        assert_eq!(first.total_seats(), 10);
        assert!(!first.tie_crumbs.is_empty());
        assert_eq!(first.tie_crumbs[0].ctx, "surplus:round1");
        assert_eq!(first.tie_crumbs[0].of, 3);
    }

    #[test]
    fn input_is_not_mutated_across_runs() {
        let e = election(
            &[("A", 5000), ("B", 3000), ("C", 1800), ("D", 200)],
            &[("B", "D")],
            0.05,
        );
        let before = e.clone();
        let first = bader_ofer(&e, &Params::default()).unwrap();
        let second = bader_ofer(&e, &Params::default()).unwrap();
        assert_eq!(e, before);
        assert_eq!(first, second);
        assert_eq!(first.values().sum::<u32>(), 120);
    }

    #[test]
    fn invalid_records_are_rejected() {
        let e = election(&[("A", 10)], &[("A", "A")], 0.0);
        assert_eq!(bader_ofer(&e, &Params::default()), Err(AllocError::SelfPair(pid("A"))));

        let e = election(&[("A", 10), ("B", 10)], &[], 0.9);
        assert_eq!(bader_ofer(&e, &Params::default()), Err(AllocError::NoQualifiedParties));
    }
}
