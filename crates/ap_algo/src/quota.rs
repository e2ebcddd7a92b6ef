//! Baseline seats under the Hare quota.
//!
//! `votes_per_seat = valid_votes / seats` is kept as an exact rational, so
//! `floor(votes / votes_per_seat)` is evaluated as
//! `floor(votes * seats / valid_votes)` in integers. The leftover fraction of
//! a quota is `((votes * seats) mod valid_votes) / valid_votes`; we store the
//! numerator, which orders remainders exactly.
//!
//! Invariants:
//! - `sum(seats) <= parliament_size`
//! - `surplus_seats = parliament_size - sum(seats) < number of survivors`

use std::collections::BTreeMap;

use crate::{AllocError, PartyId, Qualified};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
    pub valid_votes: u128,
    pub seats: BTreeMap<PartyId, u32>,
    /// `(votes * parliament_size) mod valid_votes`, per survivor.
    pub remainders: BTreeMap<PartyId, u128>,
    pub surplus_seats: u32,
}

pub fn baseline_seats(q: &Qualified, parliament_size: u32) -> Result<Baseline, AllocError> {
    if parliament_size == 0 {
        return Err(AllocError::ZeroSeats);
    }
    let valid_votes = q.valid_votes();
    if valid_votes == 0 {
        return Err(AllocError::NoQualifiedParties);
    }

    let s = parliament_size as u128;
    let mut seats = BTreeMap::new();
    let mut remainders = BTreeMap::new();
    let mut assigned: u32 = 0;

    for (p, &v) in &q.votes {
        let scaled = (v as u128) * s;
        // floor(v*s/valid) <= s since v <= valid
        let floor = (scaled / valid_votes) as u32;
        seats.insert(p.clone(), floor);
        remainders.insert(p.clone(), scaled % valid_votes);
        assigned += floor;
    }

    Ok(Baseline {
        valid_votes,
        seats,
        remainders,
        surplus_seats: parliament_size - assigned,
    })
}
