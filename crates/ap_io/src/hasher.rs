//! crates/ap_io/src/hasher.rs
//!
//! SHA-256 digests for inputs and artifacts.
//!
//! - Use `sha256_canonical(..)` for serializable values (goes through canonical_json),
//!   so two records that differ only in key order hash the same.
//! - Use `sha256_hex(..)` for raw bytes.
//! - Hex digests are lowercase.

#![forbid(unsafe_code)]

use ap_core::Election;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_bytes;
use crate::IoError;

/// SHA-256 over raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over canonical JSON bytes of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> Result<String, IoError> {
    let bytes = to_canonical_bytes(value)?;
    Ok(sha256_hex(&bytes))
}

/// Digest identifying an election record (after any scenario overrides).
pub fn election_digest(election: &Election) -> Result<String, IoError> {
    sha256_canonical(election)
}
