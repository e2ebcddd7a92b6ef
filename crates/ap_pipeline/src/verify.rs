//! Reproduce published results: run Bader-Ofer on each record and compare
//! with the expected seat table.
//!
//! Parties missing from either side count as 0 seats, so an expected table
//! that omits eliminated parties still matches.

use std::collections::{BTreeMap, BTreeSet};

use ap_algo::bader_ofer;
use ap_core::{Election, Params, PartyId};
use ap_io::ExpectedResults;
use serde::Serialize;
use tracing::{info, warn};

use crate::LOG_TARGET;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub election_id: u32,
    pub predicted: BTreeMap<PartyId, u32>,
    pub actual: BTreeMap<PartyId, u32>,
    /// Set when the engine rejected the record instead of allocating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Mismatch {
    /// Parties whose seat counts differ: (party, predicted, actual).
    pub fn differences(&self) -> Vec<(PartyId, u32, u32)> {
        let keys: BTreeSet<&PartyId> = self.predicted.keys().chain(self.actual.keys()).collect();
        keys.into_iter()
            .filter_map(|p| {
                let a = self.predicted.get(p).copied().unwrap_or(0);
                let b = self.actual.get(p).copied().unwrap_or(0);
                (a != b).then(|| (p.clone(), a, b))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Verification {
    /// Records that had an expected entry, ascending.
    pub checked: Vec<u32>,
    /// Records with no expected entry.
    pub unchecked: Vec<u32>,
    pub mismatches: Vec<Mismatch>,
}

impl Verification {
    pub fn is_success(&self) -> bool {
        !self.checked.is_empty() && self.mismatches.is_empty()
    }
}

pub fn verify_against_expected(
    elections: &[Election],
    expected: &ExpectedResults,
    params: &Params,
) -> Verification {
    let mut out = Verification::default();
    let mut sorted: Vec<&Election> = elections.iter().collect();
    sorted.sort_by_key(|e| e.election_id);

    for e in sorted {
        let Some(actual) = expected.get(&e.election_id) else {
            out.unchecked.push(e.election_id);
            continue;
        };
        out.checked.push(e.election_id);

        match bader_ofer(e, params) {
            Ok(predicted) => {
                if !same_seats(&predicted, actual) {
                    warn!(target: LOG_TARGET, election_id = e.election_id, "prediction differs from published result");
                    out.mismatches.push(Mismatch {
                        election_id: e.election_id,
                        predicted,
                        actual: actual.clone(),
                        error: None,
                    });
                }
            }
            Err(err) => {
                warn!(target: LOG_TARGET, election_id = e.election_id, error = %err, "record rejected");
                out.mismatches.push(Mismatch {
                    election_id: e.election_id,
                    predicted: BTreeMap::new(),
                    actual: actual.clone(),
                    error: Some(err.to_string()),
                });
            }
        }
    }

    info!(
        target: LOG_TARGET,
        checked = out.checked.len(),
        mismatches = out.mismatches.len(),
        "verification complete"
    );
    out
}

fn same_seats(a: &BTreeMap<PartyId, u32>, b: &BTreeMap<PartyId, u32>) -> bool {
    a.keys()
        .chain(b.keys())
        .all(|p| a.get(p).copied().unwrap_or(0) == b.get(p).copied().unwrap_or(0))
}
