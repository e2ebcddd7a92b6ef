//! Sweep → model → all three renderers.

use ap_core::{Election, Params, PartyId, SurplusPair};
use ap_pipeline::{run_sweep, standard_sweep, verify_against_expected};
use ap_report::{build_model, render_html, render_json, render_text};

fn pid(s: &str) -> PartyId {
    s.parse().unwrap()
}

fn record() -> Election {
    let votes = [
        ("Likud", 1_115_336u64),
        ("YeshAtid", 847_435),
        ("Shas", 392_964),
        ("ZionutDatit", 516_470),
        ("Avoda", 175_992),
        ("Meretz", 150_696),
    ];
    Election {
        election_id: 25,
        parties: votes.iter().map(|(p, _)| pid(p)).collect(),
        votes_per_party: votes.iter().map(|(p, v)| (pid(p), *v)).collect(),
        total_votes: 3_250_000,
        surplus_pairs: vec![SurplusPair::new(pid("Likud"), pid("ZionutDatit"))],
        electoral_threshold: 0.0325,
    }
}

#[test]
fn one_model_three_renderings() {
    let e = record();
    let params = Params::default();
    let outcomes = run_sweep(&e, &standard_sweep(), &params).unwrap();

    let base = &outcomes[0].apportionment.seats;
    let expected = [(25u32, base.clone())].into_iter().collect();
    let v = verify_against_expected(std::slice::from_ref(&e), &expected, &params);
    assert!(v.is_success());

    let coalition = vec![pid("Likud"), pid("ZionutDatit"), pid("Shas")];
    let model = build_model(&outcomes, Some(&v), Some(&coalition)).unwrap();
    assert_eq!(model.elections.len(), 1);
    assert_eq!(model.elections[0].scenarios.len(), 6);
    // Six parties plus the coalition row.
    assert_eq!(model.elections[0].comparison.rows.len(), 7);

    let text = render_text(&model);
    assert!(text.starts_with("Election 25"));
    assert!(text.contains("Coalition (Likud, ZionutDatit, Shas)"));
    assert!(text.contains("Verification passed for elections 25"));

    let json: serde_json::Value = serde_json::from_str(&render_json(&model).unwrap()).unwrap();
    assert_eq!(json["elections"][0]["scenarios"][5]["method"], "largest_remainders");
    assert_eq!(json["verification"]["success"], true);

    let html = render_html(&model).unwrap();
    assert!(html.contains("<h3>no surplus agreements</h3>"));
    assert!(html.contains("All 1 checked elections reproduced."));
}
