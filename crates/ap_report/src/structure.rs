//! Report model. Everything here is already formatted for display; renderers
//! only lay it out.

use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct ReportModel {
    pub title: String,
    /// Coalition members, when a tally was requested.
    pub coalition: Option<Vec<String>>,
    /// One section per election id, ascending.
    pub elections: Vec<SectionElection>,
    pub verification: Option<SectionVerification>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SectionElection {
    pub election_id: u32,
    pub total_votes: u64,
    /// Scenarios in the order they were run.
    pub scenarios: Vec<SectionScenario>,
    pub comparison: SectionComparison,
}

#[derive(Clone, Debug, Serialize)]
pub struct SectionScenario {
    pub label: String,
    pub method: String,
    pub threshold_pct: String,
    pub parliament_size: u32,
    pub valid_votes: u64,
    pub surplus_seats: u32,
    pub seats: Vec<SeatRow>,
    pub eliminated: Vec<String>,
    pub dropped_pairs: Vec<String>,
    pub awards: Vec<AwardRow>,
    /// Random tie draws consumed by this run.
    pub tie_draws: usize,
    pub coalition_seats: Option<u32>,
    pub input_digest: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct SeatRow {
    pub party: String,
    pub votes: u64,
    /// Share of total votes, two decimals.
    pub share_pct: String,
    pub baseline: u32,
    pub seats: u32,
    pub eliminated: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct AwardRow {
    pub round: u32,
    pub unit: String,
    pub recipient: String,
    pub score: String,
    pub tie: bool,
}

/// Party × scenario seat grid; the coalition total, if any, is the last row.
#[derive(Clone, Debug, Serialize)]
pub struct SectionComparison {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SectionVerification {
    pub success: bool,
    pub checked: Vec<u32>,
    pub unchecked: Vec<u32>,
    pub mismatches: Vec<MismatchRow>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MismatchRow {
    pub election_id: u32,
    pub error: Option<String>,
    pub differences: Vec<DiffRow>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DiffRow {
    pub party: String,
    pub predicted: u32,
    pub actual: u32,
}
