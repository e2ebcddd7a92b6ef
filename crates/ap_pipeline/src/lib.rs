//! ap_pipeline: scenario orchestration (override → allocate → verify → tally).
//!
//! Stays free of file I/O; records arrive already loaded by `ap_io` and the
//! arithmetic lives in `ap_algo`. Every scenario runs on its own clone of the
//! loaded record, so one record feeds any number of scenarios.

#![forbid(unsafe_code)]

use thiserror::Error;

pub mod coalition;
pub mod scenario;
pub mod verify;

pub use coalition::coalition_seats;
pub use scenario::{run_scenario, run_sweep, standard_sweep, Scenario, ScenarioOutcome};
pub use verify::{verify_against_expected, Mismatch, Verification};

/// `tracing` target shared by the pipeline and the CLI.
pub const LOG_TARGET: &str = "apportion";

/// Single error surface for pipeline orchestration.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("allocation failed for election {election_id} ({scenario}): {source}")]
    Alloc {
        election_id: u32,
        scenario: String,
        #[source]
        source: ap_algo::AllocError,
    },

    #[error(transparent)]
    Io(#[from] ap_io::IoError),

    #[error("scenario override out of range: {0}")]
    Override(String),

    #[error("outcome violates an allocation invariant: {0}")]
    Invariant(String),
}
