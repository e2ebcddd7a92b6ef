//! Plain-text rendering for terminals: one seat grid per election, then the
//! per-scenario notes, then the verification verdict.

use std::fmt::Write as _;

use crate::structure::{ReportModel, SectionComparison, SectionElection, SectionVerification};

pub fn render_text(model: &ReportModel) -> String {
    let mut buf = String::new();
    for e in &model.elections {
        election(&mut buf, e);
    }
    if let Some(v) = &model.verification {
        verification(&mut buf, v);
    }
    buf
}

fn election(buf: &mut String, e: &SectionElection) {
    let _ = writeln!(buf, "Election {} ({} votes cast)", e.election_id, e.total_votes);
    grid(buf, &e.comparison);
    for s in &e.scenarios {
        let _ = writeln!(
            buf,
            "  [{}] {} at {}: {} surplus of {} seats",
            s.label, s.method, s.threshold_pct, s.surplus_seats, s.parliament_size
        );
        if !s.eliminated.is_empty() {
            let _ = writeln!(buf, "    below threshold: {}", s.eliminated.join(", "));
        }
        if !s.dropped_pairs.is_empty() {
            let _ = writeln!(buf, "    agreements dropped: {}", s.dropped_pairs.join(", "));
        }
        let ties = s.awards.iter().filter(|w| w.tie).count();
        if ties > 0 {
            let _ = writeln!(buf, "    ties broken: {} ({} random draws)", ties, s.tie_draws);
        }
    }
    buf.push('\n');
}

/// Left-aligned first column, right-aligned numbers.
fn grid(buf: &mut String, c: &SectionComparison) {
    let cols = c.header.len();
    let mut widths: Vec<usize> = c.header.iter().map(|h| h.chars().count()).collect();
    for row in &c.rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    let line = |buf: &mut String, cells: &[String]| {
        buf.push_str("  ");
        for (i, cell) in cells.iter().enumerate().take(cols) {
            if i == 0 {
                let _ = write!(buf, "{:<w$}", cell, w = widths[0]);
            } else {
                let _ = write!(buf, "  {:>w$}", cell, w = widths[i]);
            }
        }
        buf.push('\n');
    };
    line(buf, &c.header);
    for row in &c.rows {
        line(buf, row);
    }
}

fn verification(buf: &mut String, v: &SectionVerification) {
    if v.success {
        let ids: Vec<String> = v.checked.iter().map(u32::to_string).collect();
        let _ = writeln!(buf, "Verification passed for elections {}", ids.join(", "));
    } else if v.checked.is_empty() {
        let _ = writeln!(buf, "Verification: no record had an expected result");
    }
    for m in &v.mismatches {
        match &m.error {
            Some(err) => {
                let _ = writeln!(buf, "Election {}: rejected: {}", m.election_id, err);
            }
            None => {
                let _ = writeln!(buf, "Election {}: prediction differs", m.election_id);
                for d in &m.differences {
                    let _ = writeln!(
                        buf,
                        "    {}: predicted {}, published {}",
                        d.party, d.predicted, d.actual
                    );
                }
            }
        }
    }
    if !v.unchecked.is_empty() {
        let ids: Vec<String> = v.unchecked.iter().map(u32::to_string).collect();
        let _ = writeln!(buf, "No expected result for elections {}", ids.join(", "));
    }
}
