// crates/ap_cli/src/main.rs
//
// `apportion`: load → override → allocate (one scenario or the sweep) →
// verify → report. Exit codes:
//   0 OK, 2 validation/usage, 3 verification mismatch, 4 I/O, 5 allocation.

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const VERIFY: i32 = 3;
    pub const IO: i32 = 4;
    pub const ALLOC: i32 = 5;
}

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use ap_core::{Election, Params, SurplusPair};
use ap_io::{
    canonical_json, load_election, load_elections_dir, load_expected_results, load_params, IoError,
};
use ap_pipeline::{
    coalition::parse_coalition, run_sweep, standard_sweep, verify_against_expected, PipelineError,
    Scenario, ScenarioOutcome, Verification, LOG_TARGET,
};
use ap_report::{build_model, render_text, ReportError, ReportModel};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use args::{parse_and_validate as parse_cli, Args, RenderFormat};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Malformed records, params, expected tables or flag values.
    Validation(String),
    /// Predictions differ from the published results.
    Verify(String),
    /// Read/write/path/limit failures.
    Io(String),
    /// The engine refused a record or broke an invariant.
    Alloc(String),
    /// Report build or rendering.
    Render(String),
}

impl fmt::Display for MainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "validation: {m}"),
            MainError::Verify(m) => write!(f, "verification: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
            MainError::Alloc(m) => write!(f, "allocation: {m}"),
            MainError::Render(m) => write!(f, "render: {m}"),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("apportion: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };

    init_tracing(&args);

    let rc = match run_once(&args) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("apportion: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// `RUST_LOG` is honored; the flags set the level for the `apportion` target.
fn init_tracing(args: &Args) {
    let level = if args.quiet {
        "warn"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let mut filter = EnvFilter::from_default_env();
    if let Ok(d) = format!("{LOG_TARGET}={level}").parse() {
        filter = filter.add_directive(d);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_once(args: &Args) -> Result<(), MainError> {
    // 1) Params: file (or defaults), then flag overrides
    let params = resolve_params(args)?;

    // 2) Records
    let elections = load_inputs(args)?;
    info!(target: LOG_TARGET, records = elections.len(), seats = params.parliament_size, "inputs loaded");

    let coalition = args
        .coalition
        .as_deref()
        .map(parse_coalition)
        .transpose()
        .map_err(|e| MainError::Validation(format!("--coalition: {e}")))?;

    // 3) Scenarios
    let scenarios = if args.sweep {
        standard_sweep()
    } else {
        vec![single_scenario(args)]
    };
    let mut outcomes: Vec<ScenarioOutcome> = Vec::new();
    for e in &elections {
        outcomes.extend(run_sweep(e, &scenarios, &params).map_err(map_pipeline_err)?);
    }

    // 4) Verification against published tables
    let verification = match &args.expected {
        Some(path) => {
            let expected = load_expected_results(path).map_err(map_io_err)?;
            Some(verify_against_expected(&elections, &expected, &params))
        }
        None => None,
    };

    // 5) Report + artifacts
    let model = build_model(&outcomes, verification.as_ref(), coalition.as_deref())
        .map_err(map_report_err)?;
    match &args.out {
        Some(dir) => {
            write_artifacts(dir, &outcomes, verification.as_ref(), &params)?;
            for kind in formats(args) {
                let path = dir.join(format!("report.{}", extension(kind)));
                fs::write(&path, render(kind, &model)?)
                    .map_err(|e| MainError::Io(format!("write {}: {e}", path.display())))?;
            }
            info!(target: LOG_TARGET, out = %dir.display(), "artifacts written");
        }
        None => {
            for kind in formats(args) {
                print!("{}", render(kind, &model)?);
            }
        }
    }

    // Mismatches still get their report first.
    if let Some(v) = &verification {
        if v.checked.is_empty() {
            return Err(MainError::Verify("no record has an expected result".into()));
        }
        if !v.mismatches.is_empty() {
            let ids: Vec<String> = v.mismatches.iter().map(|m| m.election_id.to_string()).collect();
            return Err(MainError::Verify(format!(
                "{} of {} elections differ: {}",
                v.mismatches.len(),
                v.checked.len(),
                ids.join(", ")
            )));
        }
    }
    Ok(())
}

fn resolve_params(args: &Args) -> Result<Params, MainError> {
    let mut params = match &args.params {
        Some(p) => load_params(p).map_err(map_io_err)?,
        None => Params::default(),
    };
    if let Some(s) = args.seats {
        params.parliament_size = s;
    }
    if let Some(tp) = args.tie_policy {
        params.tie_policy = tp;
    }
    if let Some(seed) = args.seed {
        params.tie_seed = seed;
    }
    params
        .validate_domains()
        .map_err(|e| MainError::Validation(format!("params: {e}")))?;
    Ok(params)
}

/// Directory records first, then explicit files; ascending by id.
fn load_inputs(args: &Args) -> Result<Vec<Election>, MainError> {
    let mut out: Vec<Election> = Vec::new();
    if let Some(dir) = &args.data_dir {
        out.extend(load_elections_dir(dir).map_err(map_io_err)?);
    }
    for p in &args.elections {
        out.push(load_election(p).map_err(map_io_err)?);
    }

    let mut seen = BTreeSet::new();
    for e in &out {
        if !seen.insert(e.election_id) {
            return Err(MainError::Validation(format!(
                "election {} supplied more than once",
                e.election_id
            )));
        }
    }
    out.sort_by_key(|e| e.election_id);
    Ok(out)
}

/// The one scenario described by the override flags.
fn single_scenario(args: &Args) -> Scenario {
    let mut s = Scenario::baseline();
    let mut parts: Vec<String> = Vec::new();
    if let Some(m) = args.method {
        s = s.with_method(m);
        parts.push(m.to_string());
    }
    if let Some(t) = args.threshold {
        s = s.with_threshold(t);
        parts.push(format!("threshold {:.2}%", t * 100.0));
    }
    if args.no_surplus_pairs {
        s = s.without_surplus_pairs();
        parts.push("no surplus agreements".into());
    }
    if parts.is_empty() {
        s
    } else {
        s.labelled(parts.join(", "))
    }
}

fn formats(args: &Args) -> Vec<RenderFormat> {
    if args.render.is_empty() {
        vec![RenderFormat::Text]
    } else {
        args.render.clone()
    }
}

fn extension(kind: RenderFormat) -> &'static str {
    match kind {
        RenderFormat::Text => "txt",
        RenderFormat::Json => "json",
        RenderFormat::Html => "html",
    }
}

fn render(kind: RenderFormat, model: &ReportModel) -> Result<String, MainError> {
    match kind {
        RenderFormat::Text => Ok(render_text(model)),
        RenderFormat::Json => render_json_report(model),
        RenderFormat::Html => render_html_report(model),
    }
}

// Always accept the concrete model type; gate body by feature.
fn render_json_report(model: &ReportModel) -> Result<String, MainError> {
    #[cfg(feature = "report-json")]
    {
        ap_report::render_json(model).map_err(map_report_err)
    }
    #[cfg(not(feature = "report-json"))]
    {
        let _ = model;
        Err(MainError::Render(
            "json renderer not enabled (build with feature `report-json`)".into(),
        ))
    }
}

fn render_html_report(model: &ReportModel) -> Result<String, MainError> {
    #[cfg(feature = "report-html")]
    {
        ap_report::render_html(model).map_err(map_report_err)
    }
    #[cfg(not(feature = "report-html"))]
    {
        let _ = model;
        Err(MainError::Render(
            "html renderer not enabled (build with feature `report-html`)".into(),
        ))
    }
}

// ----------------------------- artifacts -----------------------------

fn write_artifacts(
    out_dir: &Path,
    outcomes: &[ScenarioOutcome],
    verification: Option<&Verification>,
    params: &Params,
) -> Result<(), MainError> {
    fs::create_dir_all(out_dir)
        .map_err(|e| MainError::Io(format!("mkdir {}: {e}", out_dir.display())))?;

    let path = out_dir.join("results.json");
    canonical_json::write_canonical_file(&path, &results_json(outcomes, verification, params))
        .map_err(|e| MainError::Io(format!("write results.json: {e}")))
}

/// Everything needed to audit a run: params, per-scenario seats and rounds,
/// and the verification verdict.
fn results_json(
    outcomes: &[ScenarioOutcome],
    verification: Option<&Verification>,
    params: &Params,
) -> Value {
    json!({
        "engine": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        },
        "params": params,
        "outcomes": outcomes.iter().map(outcome_json).collect::<Vec<_>>(),
        "verification": verification,
    })
}

fn outcome_json(o: &ScenarioOutcome) -> Value {
    let a = &o.apportionment;
    json!({
        "election_id": o.election_id,
        "scenario": o.scenario,
        "threshold": o.threshold,
        "input_digest": o.input_digest,
        "method": a.method,
        "parliament_size": a.parliament_size,
        "order": a.order,
        "seats": a.seats,
        "baseline": a.baseline,
        "eliminated": a.eliminated,
        "dropped_pairs": a.dropped_pairs.iter().map(SurplusPair::label).collect::<Vec<_>>(),
        "valid_votes": u64::try_from(a.valid_votes).unwrap_or(u64::MAX),
        "surplus_seats": a.surplus_seats,
        "awards": a.awards.iter().map(|w| json!({
            "round": w.round,
            "unit": w.unit,
            "recipient": w.recipient,
            "score": w.score.to_string(),
            "tie": w.tie,
        })).collect::<Vec<_>>(),
        "tie_crumbs": a.tie_crumbs,
    })
}

// ----------------------------- error mapping -----------------------------

fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Verify(_) => VERIFY,
        MainError::Io(_) => IO,
        MainError::Alloc(_) => ALLOC,
        MainError::Render(_) => IO,
    }
}

fn map_io_err(e: IoError) -> MainError {
    use IoError::*;
    match e {
        // Parsed badly or violates a record invariant
        Json { pointer, msg } => MainError::Validation(format!("json {pointer}: {msg}")),
        Invalid(m) => MainError::Validation(format!("invalid: {m}")),

        // I/O-ish
        Read { path, msg } => MainError::Io(format!("read {path}: {msg}")),
        Path(m) => MainError::Io(format!("path: {m}")),
        Limit(m) => MainError::Io(format!("limit: {m}")),
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Io(io) => map_io_err(io),
        PipelineError::Override(m) => MainError::Validation(m),
        e @ (PipelineError::Alloc { .. } | PipelineError::Invariant(_)) => {
            MainError::Alloc(e.to_string())
        }
    }
}

fn map_report_err(e: ReportError) -> MainError {
    match e {
        ReportError::Empty => MainError::Validation(e.to_string()),
        ReportError::Inconsistent { .. } => MainError::Alloc(e.to_string()),
        ReportError::Json(_) | ReportError::Template(_) => MainError::Render(e.to_string()),
    }
}
