//! Coalition tallies over a seat map.

use std::collections::BTreeMap;

use ap_core::PartyId;
use tracing::warn;

use crate::LOG_TARGET;

/// Sum of members' seats. Unknown members count 0 and are logged.
pub fn coalition_seats(seats: &BTreeMap<PartyId, u32>, members: &[PartyId]) -> u32 {
    members
        .iter()
        .map(|m| match seats.get(m) {
            Some(&s) => s,
            None => {
                warn!(target: LOG_TARGET, party = %m, "coalition member not in results");
                0
            }
        })
        .sum()
}

/// Parse "A,B,C" into party ids; blanks are skipped.
pub fn parse_coalition(list: &str) -> Result<Vec<PartyId>, ap_core::CoreError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
