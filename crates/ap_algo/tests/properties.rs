//! Property tests for both allocation methods.
//!
//! Records are generated with 1..=8 parties, optional unallocated ballots
//! (so `total_votes` can exceed the party sum), thresholds up to 20% and
//! legislatures of 1..=150 seats.

use std::collections::BTreeMap;

use ap_algo::{
    allocate, apply_threshold, bader_ofer, bader_ofer_detailed, baseline_seats,
    largest_remainders, AllocError, AllocationMethod, Election, Params, PartyId, SurplusPair,
    TiePolicy,
};
use proptest::prelude::*;

const NAMES: [&str; 8] = ["Likud", "YeshAtid", "Shas", "Meretz", "Avoda", "Kulanu", "Balad", "Raam"];

fn pid(s: &str) -> PartyId {
    s.parse().unwrap()
}

fn build(votes: &[u64], extra: u64, threshold: f64, pair_adjacent: bool) -> Election {
    let parties: Vec<PartyId> = NAMES.iter().take(votes.len()).map(|n| pid(n)).collect();
    let votes_per_party: BTreeMap<PartyId, u64> =
        parties.iter().cloned().zip(votes.iter().copied()).collect();
    let surplus_pairs = if pair_adjacent {
        parties
            .chunks(2)
            .filter(|c| c.len() == 2)
            .map(|c| SurplusPair::new(c[0].clone(), c[1].clone()))
            .collect()
    } else {
        Vec::new()
    };
    Election {
        election_id: 1,
        total_votes: votes.iter().sum::<u64>() + extra + 1,
        parties,
        votes_per_party,
        surplus_pairs,
        electoral_threshold: threshold,
    }
}

fn record() -> impl Strategy<Value = (Vec<u64>, u64, f64, bool, u32)> {
    (
        prop::collection::vec(0u64..2_000_000, 1..=8),
        0u64..50_000,
        0.0f64..0.2,
        any::<bool>(),
        1u32..=150,
    )
}

fn only_degenerate<T: std::fmt::Debug>(r: &Result<T, AllocError>) -> bool {
    matches!(r, Ok(_) | Err(AllocError::NoQualifiedParties))
}

proptest! {
    #[test]
    fn seats_are_conserved((votes, extra, t, paired, seats) in record()) {
        let e = build(&votes, extra, t, paired);
        let params = Params::with_seats(seats);
        for method in [AllocationMethod::BaderOfer, AllocationMethod::LargestRemainders] {
            let r = allocate(&e, &params, method);
            prop_assert!(only_degenerate(&r));
            if let Ok(a) = r {
                prop_assert_eq!(a.total_seats(), seats);
                prop_assert_eq!(a.seats.len(), e.votes_per_party.len());
            }
        }
    }

    #[test]
    fn eliminated_parties_hold_no_seats((votes, extra, t, paired, seats) in record()) {
        let e = build(&votes, extra, t, paired);
        let params = Params::with_seats(seats);
        if let Ok(bo) = bader_ofer(&e, &params) {
            let lr = largest_remainders(&e, &params).unwrap();
            for (p, &v) in &e.votes_per_party {
                if (v as f64) / (e.total_votes as f64) < t {
                    prop_assert_eq!(bo[p], 0);
                    prop_assert_eq!(lr[p], 0);
                }
            }
        }
    }

    #[test]
    fn larger_parties_never_trail_smaller_ones((votes, extra, t, seats) in
        (prop::collection::vec(0u64..2_000_000, 1..=8), 0u64..50_000, 0.0f64..0.2, 1u32..=150))
    {
        let e = build(&votes, extra, t, false);
        let params = Params::with_seats(seats);
        for method in [AllocationMethod::BaderOfer, AllocationMethod::LargestRemainders] {
            let Ok(a) = allocate(&e, &params, method) else { continue };
            for (p, &vp) in &e.votes_per_party {
                for (q, &vq) in &e.votes_per_party {
                    if vp > vq {
                        prop_assert!(a.seats[p] >= a.seats[q], "{method}: {p} {vp} vs {q} {vq}");
                    }
                }
            }
        }
    }

    // Unpaired only. With agreements a gain can cost seats legitimately:
    // votes [98, 43, 135, 139], pairs A+B and C+D, 2 seats, threshold 10%.
    // Raising A to 134 lifts the total so B (43) drops under 10%, the pair
    // dissolves and A goes from 1 seat to 0.
    #[test]
    fn raising_votes_never_costs_seats(
        (votes, extra, t, seats) in
            (prop::collection::vec(0u64..2_000_000, 1..=8), 0u64..50_000, 0.0f64..0.2, 1u32..=150),
        which in any::<prop::sample::Index>(),
        gain in 1u64..500_000,
    ) {
        let before = build(&votes, extra, t, false);
        let p = before.parties[which.index(before.parties.len())].clone();
        let mut after = before.clone();
        *after.votes_per_party.entry(p.clone()).or_insert(0) += gain;
        after.total_votes += gain;

        let params = Params::with_seats(seats);
        for method in [AllocationMethod::BaderOfer, AllocationMethod::LargestRemainders] {
            let (Ok(x), Ok(y)) = (allocate(&before, &params, method), allocate(&after, &params, method))
            else { continue };
            prop_assert!(
                y.seats_of(&p) >= x.seats_of(&p),
                "{method}: {p} +{gain} went from {} to {}", x.seats_of(&p), y.seats_of(&p)
            );
        }
    }

    #[test]
    fn pairs_only_move_seats_between_survivors((votes, extra, t, seats) in
        (prop::collection::vec(0u64..2_000_000, 2..=8), 0u64..50_000, 0.0f64..0.2, 1u32..=150))
    {
        let plain = build(&votes, extra, t, false);
        let paired = build(&votes, extra, t, true);
        let params = Params::with_seats(seats);
        match (bader_ofer_detailed(&plain, &params), bader_ofer_detailed(&paired, &params)) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.total_seats(), b.total_seats());
                prop_assert_eq!(&a.eliminated, &b.eliminated);
                prop_assert_eq!(&a.baseline, &b.baseline);
                // Every party keeps at least its baseline either way.
                for (p, &base) in &b.baseline {
                    prop_assert!(b.seats[p] >= base);
                }
            }
            (Err(x), Err(y)) => prop_assert_eq!(x, y),
            (x, y) => prop_assert!(false, "diverging outcomes: {x:?} vs {y:?}"),
        }
    }

    #[test]
    fn runs_are_reproducible((votes, extra, t, paired, seats) in record(), seed in any::<u64>()) {
        let e = build(&votes, extra, t, paired);
        let before = e.clone();
        let params = Params { parliament_size: seats, tie_policy: TiePolicy::Random, tie_seed: seed };
        for method in [AllocationMethod::BaderOfer, AllocationMethod::LargestRemainders] {
            prop_assert_eq!(allocate(&e, &params, method), allocate(&e, &params, method));
        }
        prop_assert_eq!(e, before);
    }

    #[test]
    fn largest_remainders_adds_at_most_one_per_party((votes, extra, seats) in
        (prop::collection::vec(1u64..2_000_000, 1..=8), 0u64..50_000, 1u32..=150))
    {
        // Threshold 0: nobody is eliminated.
        let e = build(&votes, extra, 0.0, false);
        let params = Params::with_seats(seats);
        let base = baseline_seats(&apply_threshold(&e), seats).unwrap();
        let lr = largest_remainders(&e, &params).unwrap();

        let mut bumped: Vec<&PartyId> = Vec::new();
        for (p, &b) in &base.seats {
            let extra_seat = lr[p] - b;
            prop_assert!(extra_seat <= 1);
            if extra_seat == 1 {
                bumped.push(p);
            }
        }
        prop_assert_eq!(bumped.len() as u32, base.surplus_seats);
        // Anyone bumped has a remainder at least as large as anyone not bumped.
        for p in &bumped {
            for (q, &rq) in &base.remainders {
                if !bumped.contains(&q) {
                    prop_assert!(base.remainders[*p] >= rq);
                }
            }
        }
    }
}

// ---- fixed scenarios ----

fn worked_example() -> Election {
    build(&[30_000, 20_000, 5_000], 0, 0.0, false)
}

#[test]
fn worked_example_both_methods() {
    let mut e = worked_example();
    e.total_votes = 55_000;
    let params = Params::with_seats(10);

    let bo = bader_ofer(&e, &params).unwrap();
    assert_eq!(bo[&pid("Likud")], 6);
    assert_eq!(bo[&pid("YeshAtid")], 4);
    assert_eq!(bo[&pid("Shas")], 0);

    let lr = largest_remainders(&e, &params).unwrap();
    assert_eq!(lr[&pid("Likud")], 5);
    assert_eq!(lr[&pid("YeshAtid")], 4);
    assert_eq!(lr[&pid("Shas")], 1);
}

#[test]
fn threshold_boundary_is_inclusive() {
    // Shas holds exactly 3.25% of 10000 ballots.
    let mut e = build(&[6_000, 3_675, 325], 0, 0.0325, false);
    e.total_votes = 10_000;
    let a = bader_ofer_detailed(&e, &Params::default()).unwrap();
    assert!(a.eliminated.is_empty());
    assert!(a.seats[&pid("Shas")] > 0);

    e.votes_per_party.insert(pid("Shas"), 324);
    e.votes_per_party.insert(pid("YeshAtid"), 3_676);
    let a = bader_ofer_detailed(&e, &Params::default()).unwrap();
    assert_eq!(a.eliminated, vec![pid("Shas")]);
    assert_eq!(a.seats[&pid("Shas")], 0);
    assert_eq!(a.total_seats(), 120);
}

#[test]
fn one_record_feeds_many_scenarios() {
    let mut e = build(&[40_000, 30_000, 20_000, 2_000], 8_000, 0.0, true);
    e.electoral_threshold = 0.0325;
    let before = e.clone();

    let first = bader_ofer(&e, &Params::default()).unwrap();
    let _ = largest_remainders(&e, &Params::default()).unwrap();
    let mut lowered = e.clone();
    lowered.electoral_threshold = 0.01;
    let _ = bader_ofer(&lowered, &Params::default()).unwrap();
    let again = bader_ofer(&e, &Params::default()).unwrap();

    assert_eq!(e, before);
    assert_eq!(first, again);
    assert_eq!(first.keys().count(), 4);
    assert_eq!(first[&pid("Meretz")], 0);
}

#[test]
fn gain_that_dissolves_an_agreement_can_cost_a_seat() {
    // Likud+YeshAtid and Shas+Meretz pool surplus; 2 seats, 10% threshold.
    let e = build(&[98, 43, 135, 139], 0, 0.1, true);
    let params = Params::with_seats(2);
    assert_eq!(bader_ofer(&e, &params).unwrap()[&pid("Likud")], 1);

    let mut grown = e.clone();
    grown.votes_per_party.insert(pid("Likud"), 134);
    grown.total_votes += 36;
    let a = bader_ofer_detailed(&grown, &params).unwrap();
    assert_eq!(a.eliminated, vec![pid("YeshAtid")]);
    assert_eq!(a.dropped_pairs.len(), 1);
    assert_eq!(a.seats[&pid("Likud")], 0);
}
