//! crates/ap_io/src/lib.rs
//! Local-file I/O for the apportionment engine.
//!
//! - `loader`: election records, expected-results tables, parameter files.
//! - `canonical_json`: sorted-key compact JSON and atomic file writes.
//! - `hasher`: lowercase SHA-256 digests over raw or canonical bytes.
//!
//! Everything is offline; paths are plain filesystem paths.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for ap_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (create_dir_all, rename, missing dir, etc.)
    #[error("io/path error: {0}")]
    Path(String),

    /// Failure reading a specific file.
    #[error("read error: {path}: {msg}")]
    Read { path: String, msg: String },

    /// JSON serialization/deserialization errors with a JSON Pointer hint.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Input exceeded a size limit.
    #[error("limit exceeded: {0}")]
    Limit(String),

    /// Parsed fine but violates a record invariant.
    #[error("invalid: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json reports line/column, not a pointer; default to root.
        IoError::Json {
            pointer: "/".to_string(),
            msg: e.to_string(),
        }
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod loader;

pub use loader::{
    load_election, load_elections_dir, load_expected_results, load_params, ExpectedResults,
};
