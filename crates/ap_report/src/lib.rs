//! ap_report: offline report model plus renderers (text, JSON, HTML).
//!
//! Rules:
//! - No I/O here. Callers pass outcomes already computed by `ap_pipeline`.
//! - Percent strings come from integer arithmetic on vote counts.
//! - Sections are ordered by election id; scenarios keep their run order.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use ap_core::{PartyId, SurplusPair};
use ap_pipeline::{coalition_seats, Mismatch, ScenarioOutcome, Verification};
use thiserror::Error;

pub mod structure;

mod render_text;
#[cfg(feature = "render_json")]
mod render_json;
#[cfg(feature = "render_html")]
mod render_html;

pub use render_text::render_text;
#[cfg(feature = "render_json")]
pub use render_json::render_json;
#[cfg(feature = "render_html")]
pub use render_html::render_html;
pub use structure::*;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("nothing to report: no outcomes and no verification")]
    Empty,

    #[error("election {election_id}: {reason}")]
    Inconsistent { election_id: u32, reason: String },

    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("template error: {0}")]
    Template(String),
}

/// Build the report model (pure, offline).
///
/// Outcomes that break an allocation invariant are refused rather than
/// rendered.
pub fn build_model(
    outcomes: &[ScenarioOutcome],
    verification: Option<&Verification>,
    coalition: Option<&[PartyId]>,
) -> Result<ReportModel, ReportError> {
    if outcomes.is_empty() && verification.is_none() {
        return Err(ReportError::Empty);
    }

    let mut by_election: BTreeMap<u32, Vec<&ScenarioOutcome>> = BTreeMap::new();
    for o in outcomes {
        o.check_invariants().map_err(|e| ReportError::Inconsistent {
            election_id: o.election_id,
            reason: e.to_string(),
        })?;
        by_election.entry(o.election_id).or_default().push(o);
    }

    let elections = by_election
        .into_iter()
        .map(|(id, runs)| election_section(id, &runs, coalition))
        .collect();

    Ok(ReportModel {
        title: "Seat apportionment".into(),
        coalition: coalition.map(|c| c.iter().map(ToString::to_string).collect()),
        elections,
        verification: verification.map(verification_section),
    })
}

fn election_section(
    election_id: u32,
    runs: &[&ScenarioOutcome],
    coalition: Option<&[PartyId]>,
) -> SectionElection {
    let scenarios: Vec<SectionScenario> =
        runs.iter().map(|o| scenario_section(o, coalition)).collect();
    let comparison = comparison_table(runs, &scenarios, coalition);
    SectionElection {
        election_id,
        total_votes: runs.first().map_or(0, |o| o.total_votes),
        scenarios,
        comparison,
    }
}

fn scenario_section(o: &ScenarioOutcome, coalition: Option<&[PartyId]>) -> SectionScenario {
    let a = &o.apportionment;
    let seats = a
        .ordered_seats()
        .into_iter()
        .map(|(p, seats)| {
            let votes = o.votes_per_party.get(p).copied().unwrap_or(0);
            SeatRow {
                party: p.to_string(),
                votes,
                share_pct: percent_2dp(votes, o.total_votes),
                baseline: a.baseline.get(p).copied().unwrap_or(0),
                seats,
                eliminated: a.eliminated.contains(p),
            }
        })
        .collect();

    SectionScenario {
        label: o.scenario.label.clone(),
        method: a.method.to_string(),
        threshold_pct: threshold_pct(o.threshold),
        parliament_size: a.parliament_size,
        valid_votes: u64::try_from(a.valid_votes).unwrap_or(u64::MAX),
        surplus_seats: a.surplus_seats,
        seats,
        eliminated: a.eliminated.iter().map(ToString::to_string).collect(),
        dropped_pairs: a.dropped_pairs.iter().map(SurplusPair::label).collect(),
        awards: a
            .awards
            .iter()
            .map(|w| AwardRow {
                round: w.round,
                unit: w.unit.clone(),
                recipient: w.recipient.to_string(),
                score: w.score.to_string(),
                tie: w.tie,
            })
            .collect(),
        tie_draws: a.tie_crumbs.len(),
        coalition_seats: coalition.map(|c| coalition_seats(&a.seats, c)),
        input_digest: o.input_digest.clone(),
    }
}

fn comparison_table(
    runs: &[&ScenarioOutcome],
    sections: &[SectionScenario],
    coalition: Option<&[PartyId]>,
) -> SectionComparison {
    let mut header = vec!["Party".to_string()];
    header.extend(runs.iter().map(|o| o.scenario.label.clone()));

    // Every run of one election shares the record, but overrides never add
    // parties; union anyway so a mixed slice still renders.
    let mut order: Vec<&PartyId> = Vec::new();
    for o in runs {
        for p in &o.apportionment.order {
            if !order.contains(&p) {
                order.push(p);
            }
        }
    }

    let mut rows: Vec<Vec<String>> = order
        .iter()
        .map(|p| {
            let mut row = vec![p.to_string()];
            row.extend(runs.iter().map(|o| o.apportionment.seats_of(p).to_string()));
            row
        })
        .collect();

    if let Some(members) = coalition {
        let names: Vec<&str> = members.iter().map(PartyId::as_str).collect();
        let mut row = vec![format!("Coalition ({})", names.join(", "))];
        row.extend(
            sections
                .iter()
                .map(|s| s.coalition_seats.unwrap_or(0).to_string()),
        );
        rows.push(row);
    }

    SectionComparison { header, rows }
}

fn verification_section(v: &Verification) -> SectionVerification {
    SectionVerification {
        success: v.is_success(),
        checked: v.checked.clone(),
        unchecked: v.unchecked.clone(),
        mismatches: v.mismatches.iter().map(mismatch_row).collect(),
    }
}

fn mismatch_row(m: &Mismatch) -> MismatchRow {
    MismatchRow {
        election_id: m.election_id,
        error: m.error.clone(),
        differences: m
            .differences()
            .into_iter()
            .map(|(p, predicted, actual)| DiffRow {
                party: p.to_string(),
                predicted,
                actual,
            })
            .collect(),
    }
}

// ===== Helpers =====

/// `num/den` as a percentage with two decimals, rounded half-up, no floats.
pub fn percent_2dp(num: u64, den: u64) -> String {
    if den == 0 {
        return "n/a".into();
    }
    let den = den as u128;
    let hundredths = (num as u128 * 10_000 + den / 2) / den;
    format!("{}.{:02}%", hundredths / 100, hundredths % 100)
}

/// Thresholds are stored as fractions; shown as percentages.
fn threshold_pct(t: f64) -> String {
    format!("{:.2}%", t * 100.0)
}
