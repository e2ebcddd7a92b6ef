// crates/ap_cli/src/args.rs
//
// Offline CLI argument surface (types, value parsers, post-parse checks).
//
// Rules:
// - No networked paths (reject any scheme:// like http/https/file)
// - At least one input: --election (repeatable) or --data-dir
// - --sweep replaces the single-scenario overrides (--method/--threshold/--no-surplus-pairs)
// - Seed override accepts u64 decimal or 0x-hex up to 16 nybbles

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use ap_core::{AllocationMethod, TiePolicy};
use clap::{ArgAction, Parser, ValueEnum};

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "apportion",
    version,
    disable_help_subcommand = true,
    about = "Offline seat apportionment (Bader-Ofer, largest remainders) over election records"
)]
pub struct Args {
    // --- Inputs ---
    /// Election record JSON (repeatable).
    #[arg(long = "election", value_name = "FILE")]
    pub elections: Vec<PathBuf>,
    /// Directory of election record JSON files (non-recursive).
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
    /// Params JSON: parliament_size, tie_policy, tie_seed.
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,
    /// Published seat tables keyed by election id; enables verification.
    #[arg(long, value_name = "FILE")]
    pub expected: Option<PathBuf>,

    // --- Overrides ---
    /// Surplus distribution rule.
    #[arg(long, value_parser = parse_method)]
    pub method: Option<AllocationMethod>,
    /// Electoral threshold as a fraction in [0, 1), applied to every record.
    #[arg(long, value_parser = parse_threshold)]
    pub threshold: Option<f64>,
    /// Ignore the records' surplus agreements.
    #[arg(long)]
    pub no_surplus_pairs: bool,
    /// Parliament size.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub seats: Option<u32>,
    /// deterministic_order | random
    #[arg(long, value_parser = parse_tie_policy)]
    pub tie_policy: Option<TiePolicy>,
    /// Tie RNG seed. Accepts decimal u64 or 0x-hex (≤16 hex digits).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,

    // --- Scenarios ---
    /// Run the standard comparison set on every record.
    #[arg(long, conflicts_with_all = ["method", "threshold", "no_surplus_pairs"])]
    pub sweep: bool,
    /// Comma-separated party ids whose seats are tallied per scenario.
    #[arg(long, value_name = "A,B,...")]
    pub coalition: Option<String>,

    // --- Output & rendering ---
    /// Report format(s). Repeatable; defaults to text.
    #[arg(long, value_enum, action = ArgAction::Append)]
    pub render: Vec<RenderFormat>,
    /// Write results.json and reports here instead of printing to stdout.
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,
    /// Only warnings and errors on stderr.
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    Text,
    Json,
    Html,
}

/// Errors surfaced by post-parse validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    Missing(&'static str),
    NonLocalPath(String),
    NotFound(String),
    NotADirectory(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            Missing(s) => write!(f, "missing required input: {s}"),
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
            NotADirectory(p) => write!(f, "not a directory: {p}"),
        }
    }
}
impl std::error::Error for CliError {}

// ----------------------------- value parsers -----------------------------

/// Decimal u64 or 0x-hex (1..=16 nybbles).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into())
    }
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let t: f64 = s.trim().parse().map_err(|_| format!("not a number: {s}"))?;
    if !t.is_finite() || !(0.0..1.0).contains(&t) {
        return Err("threshold must be a fraction in [0, 1)".into());
    }
    Ok(t)
}

fn parse_method(s: &str) -> Result<AllocationMethod, String> {
    s.parse()
        .map_err(|_| "expected bader-ofer or largest-remainders".to_string())
}

fn parse_tie_policy(s: &str) -> Result<TiePolicy, String> {
    s.parse()
        .map_err(|_| "expected deterministic_order or random".to_string())
}

// ----------------------------- post-parse checks -----------------------------

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    validate(Args::parse())
}

/// Scheme, presence and existence checks, then path normalization.
pub fn validate(mut args: Args) -> Result<Args, CliError> {
    for p in iter_all_paths(&args) {
        ensure_local_path(p)?;
    }

    if args.elections.is_empty() && args.data_dir.is_none() {
        return Err(CliError::Missing("--election or --data-dir"));
    }

    for p in &args.elections {
        ensure_local_exists(p, "--election")?;
    }
    if let Some(dir) = &args.data_dir {
        let meta = fs::metadata(dir)
            .map_err(|_| CliError::NotFound(format!("--data-dir {}", dir.display())))?;
        if !meta.is_dir() {
            return Err(CliError::NotADirectory(format!("--data-dir {}", dir.display())));
        }
    }
    if let Some(p) = &args.params {
        ensure_local_exists(p, "--params")?;
    }
    if let Some(p) = &args.expected {
        ensure_local_exists(p, "--expected")?;
    }

    args.elections = args.elections.iter().map(|p| normalize_path(p)).collect();
    args.data_dir = args.data_dir.take().map(|p| normalize_path(&p));
    args.params = args.params.take().map(|p| normalize_path(&p));
    args.expected = args.expected.take().map(|p| normalize_path(&p));
    // Output directory may not exist yet.
    args.out = args.out.take().map(|p| normalize_path(&p));

    Ok(args)
}

/// Reject any explicit URI scheme (e.g., http://, https://, file://).
#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://")
        || lower.starts_with("http:")
        || lower.starts_with("https:")
        || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

fn iter_all_paths(args: &Args) -> impl Iterator<Item = &Path> {
    args.elections
        .iter()
        .map(PathBuf::as_path)
        .chain(
            [
                args.data_dir.as_deref(),
                args.params.as_deref(),
                args.expected.as_deref(),
                args.out.as_deref(),
            ]
            .into_iter()
            .flatten(),
        )
}

fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

/// Best-effort absolute path; falls back to CWD-relative when the path
/// does not exist yet.
fn normalize_path(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}
