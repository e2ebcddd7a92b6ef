//! Loader: read local JSON artifacts (election records, expected-results
//! tables, parameter files), enforce size limits, normalize party order and
//! return typed values. No network I/O.
//!
//! Election record shape:
//! ```json
//! { "election_id": 25,
//!   "parties": ["Likud", "YeshAtid"],
//!   "votes_per_party": { "Likud": 1115336, "YeshAtid": 847435 },
//!   "total_votes": 4764742,
//!   "surplus_pairs": [["Likud", "ZionutDatit"]],
//!   "electoral_threshold": 0.0325 }
//! ```

#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use ap_core::{Election, Params, PartyId};
use serde_json::Value;

use crate::IoError;

/// Hard cap on any single input file.
pub const MAX_INPUT_BYTES: u64 = 16 * 1024 * 1024;

/// Published seat counts: election id → party → seats.
pub type ExpectedResults = BTreeMap<u32, BTreeMap<PartyId, u32>>;

// ----------------------------- Targeted loaders -----------------------------

pub fn load_election(path: &Path) -> Result<Election, IoError> {
    let v = read_json_value_with_limits(path)?;
    election_from_value(v)
}

/// Every election record in `dir` (non-recursive), sorted by `election_id`.
///
/// A `*.json` file counts as a record when its top-level object carries both
/// `election_id` and `votes_per_party`; other JSON files (params, expected
/// results) are skipped. A record that then fails to parse is an error.
pub fn load_elections_dir(dir: &Path) -> Result<Vec<Election>, IoError> {
    let entries =
        fs::read_dir(dir).map_err(|e| IoError::Path(format!("{}: {e}", dir.display())))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().map_or(false, |x| x == "json"))
        .collect();
    paths.sort();

    let mut out: Vec<Election> = Vec::new();
    for p in paths {
        let v = read_json_value_with_limits(&p)?;
        if !looks_like_election(&v) {
            continue;
        }
        let e = election_from_value(v).map_err(|err| match err {
            IoError::Json { pointer, msg } => IoError::Json {
                pointer,
                msg: format!("{}: {msg}", p.display()),
            },
            other => other,
        })?;
        out.push(e);
    }

    out.sort_by_key(|e| e.election_id);
    if let Some(w) = out.windows(2).find(|w| w[0].election_id == w[1].election_id) {
        return Err(IoError::Invalid(format!(
            "duplicate election_id {} in {}",
            w[0].election_id,
            dir.display()
        )));
    }
    if out.is_empty() {
        return Err(IoError::Invalid(format!("no election records in {}", dir.display())));
    }
    Ok(out)
}

/// Expected-results table: `{ "<election_id>": { "<party>": seats, ... }, ... }`.
pub fn load_expected_results(path: &Path) -> Result<ExpectedResults, IoError> {
    let v = read_json_value_with_limits(path)?;
    let raw: BTreeMap<String, BTreeMap<PartyId, u32>> = serde_json::from_value(v)?;

    let mut out = ExpectedResults::new();
    for (k, seats) in raw {
        let id: u32 = k.trim().parse().map_err(|_| IoError::Json {
            pointer: format!("/{k}"),
            msg: "key is not an election id".into(),
        })?;
        out.insert(id, seats);
    }
    Ok(out)
}

/// Parameter file; unspecified fields take their defaults.
pub fn load_params(path: &Path) -> Result<Params, IoError> {
    let v = read_json_value_with_limits(path)?;
    let params: Params = serde_json::from_value(v)?;
    params
        .validate_domains()
        .map_err(|e| IoError::Invalid(format!("parameter domain error: {e}")))?;
    Ok(params)
}

// ----------------------------- Helpers -----------------------------

fn looks_like_election(v: &Value) -> bool {
    v.as_object()
        .map_or(false, |o| o.contains_key("election_id") && o.contains_key("votes_per_party"))
}

fn election_from_value(v: Value) -> Result<Election, IoError> {
    let mut e: Election = serde_json::from_value(v)?;
    // Each key of `votes_per_party` exactly once, the record's own order first.
    e.parties = e.canonical_order();
    Ok(e)
}

/// Read a file with a size cap and parse it as a JSON value.
pub fn read_json_value_with_limits(path: &Path) -> Result<Value, IoError> {
    let read_err = |e: std::io::Error| IoError::Read {
        path: path.display().to_string(),
        msg: e.to_string(),
    };

    let f = File::open(path).map_err(read_err)?;
    let mut buf = Vec::new();
    f.take(MAX_INPUT_BYTES + 1).read_to_end(&mut buf).map_err(read_err)?;
    if buf.len() as u64 > MAX_INPUT_BYTES {
        return Err(IoError::Limit(format!(
            "{} exceeds {} bytes",
            path.display(),
            MAX_INPUT_BYTES
        )));
    }
    Ok(serde_json::from_slice(&buf)?)
}
