//! Scenarios: a record plus overrides, run through one allocation method.

use std::collections::BTreeMap;

use ap_algo::{allocate, AllocationMethod, Apportionment};
use ap_core::{Election, Params, PartyId};
use ap_io::hasher;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{PipelineError, LOG_TARGET};

/// What to change before allocating. `None` / `false` keep the record's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub label: String,
    pub method: AllocationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub clear_surplus_pairs: bool,
}

impl Scenario {
    /// The record as published: Bader-Ofer, own threshold and agreements.
    pub fn baseline() -> Self {
        Self {
            label: "baseline".into(),
            method: AllocationMethod::BaderOfer,
            threshold: None,
            clear_surplus_pairs: false,
        }
    }

    pub fn with_method(mut self, method: AllocationMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn without_surplus_pairs(mut self) -> Self {
        self.clear_surplus_pairs = true;
        self
    }

    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// The record with this scenario's overrides applied.
    pub fn apply(&self, election: &Election) -> Election {
        let mut e = election.clone();
        if let Some(t) = self.threshold {
            e.electoral_threshold = t;
        }
        if self.clear_surplus_pairs {
            e.surplus_pairs.clear();
        }
        e
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::baseline()
    }
}

/// The comparison set: published rules, no agreements, thresholds of 3%, 2%
/// and 1%, and largest remainders at 2%.
pub fn standard_sweep() -> Vec<Scenario> {
    vec![
        Scenario::baseline(),
        Scenario::baseline()
            .without_surplus_pairs()
            .labelled("no surplus agreements"),
        Scenario::baseline().with_threshold(0.03).labelled("threshold 3%"),
        Scenario::baseline().with_threshold(0.02).labelled("threshold 2%"),
        Scenario::baseline().with_threshold(0.01).labelled("threshold 1%"),
        Scenario::baseline()
            .with_method(AllocationMethod::LargestRemainders)
            .with_threshold(0.02)
            .labelled("largest remainders, threshold 2%"),
    ]
}

/// One scenario's result on one record.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutcome {
    pub election_id: u32,
    pub scenario: Scenario,
    /// Threshold actually applied.
    pub threshold: f64,
    /// SHA-256 of the canonical record after overrides.
    pub input_digest: String,
    /// Vote counts as loaded, for share columns in reports.
    pub votes_per_party: BTreeMap<PartyId, u64>,
    pub total_votes: u64,
    pub apportionment: Apportionment,
}

pub fn run_scenario(
    election: &Election,
    scenario: &Scenario,
    params: &Params,
) -> Result<ScenarioOutcome, PipelineError> {
    if let Some(t) = scenario.threshold {
        if !t.is_finite() || !(0.0..1.0).contains(&t) {
            return Err(PipelineError::Override(format!(
                "threshold {t} for scenario '{}'",
                scenario.label
            )));
        }
    }

    let e = scenario.apply(election);
    let input_digest = hasher::election_digest(&e)?;

    let a = allocate(&e, params, scenario.method).map_err(|source| PipelineError::Alloc {
        election_id: e.election_id,
        scenario: scenario.label.clone(),
        source,
    })?;

    for p in &a.eliminated {
        debug!(target: LOG_TARGET, election_id = e.election_id, party = %p, "below threshold");
    }
    for sp in &a.dropped_pairs {
        warn!(
            target: LOG_TARGET,
            election_id = e.election_id,
            pair = %sp.label(),
            "surplus agreement dropped: a member missed the threshold"
        );
    }
    for w in &a.awards {
        debug!(
            target: LOG_TARGET,
            round = w.round,
            unit = %w.unit,
            recipient = %w.recipient,
            score = %w.score,
            tie = w.tie,
            "surplus seat"
        );
    }
    info!(
        target: LOG_TARGET,
        election_id = e.election_id,
        scenario = %scenario.label,
        method = %scenario.method,
        threshold = e.electoral_threshold,
        surplus_seats = a.surplus_seats,
        eliminated = a.eliminated.len(),
        "scenario complete"
    );

    Ok(ScenarioOutcome {
        election_id: e.election_id,
        scenario: scenario.clone(),
        threshold: e.electoral_threshold,
        input_digest,
        votes_per_party: e.votes_per_party,
        total_votes: e.total_votes,
        apportionment: a,
    })
}

impl ScenarioOutcome {
    /// Seats sum to the legislature, every input party is reported and
    /// eliminated parties hold nothing.
    pub fn check_invariants(&self) -> Result<(), PipelineError> {
        let a = &self.apportionment;
        if a.total_seats() != a.parliament_size {
            return Err(PipelineError::Invariant(format!(
                "{} seats allocated of {}",
                a.total_seats(),
                a.parliament_size
            )));
        }
        if a.seats.len() != a.order.len() {
            return Err(PipelineError::Invariant(format!(
                "{} parties reported of {}",
                a.seats.len(),
                a.order.len()
            )));
        }
        if let Some(p) = a.eliminated.iter().find(|p| a.seats_of(p) > 0) {
            return Err(PipelineError::Invariant(format!("eliminated party {p} holds seats")));
        }
        Ok(())
    }
}

/// Every scenario against one record, in order; stops at the first failure.
pub fn run_sweep(
    election: &Election,
    scenarios: &[Scenario],
    params: &Params,
) -> Result<Vec<ScenarioOutcome>, PipelineError> {
    scenarios
        .iter()
        .map(|s| run_scenario(election, s, params))
        .collect()
}
