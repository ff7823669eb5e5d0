use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use visdiff::{ComparisonSession, EngineConfig, Report, tier_histogram};

#[derive(Parser, Debug)]
#[command(name = "visdiff", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare a candidate snapshot against a reference snapshot.
    Compare(CompareArgs),
    /// Re-score a persisted report into per-cell scores.
    Cells(CellsArgs),
}

#[derive(Parser, Debug)]
struct CompareArgs {
    /// Reference snapshot JSON.
    #[arg(long)]
    reference: PathBuf,

    /// Candidate snapshot JSON.
    #[arg(long)]
    candidate: PathBuf,

    /// Engine configuration JSON (defaults apply to anything omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report output path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Cell score export output path.
    #[arg(long)]
    cells_out: Option<PathBuf>,

    /// Exit with status 1 when any difference is found.
    #[arg(long, default_value_t = false)]
    fail_on_diff: bool,
}

#[derive(Parser, Debug)]
struct CellsArgs {
    /// Report JSON written by `compare`.
    #[arg(long)]
    report: PathBuf,

    /// Reference snapshot JSON.
    #[arg(long)]
    reference: PathBuf,

    /// Candidate snapshot JSON.
    #[arg(long)]
    candidate: PathBuf,

    /// Engine configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cell score export output path.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compare(args) => cmd_compare(args),
        Command::Cells(args) => cmd_cells(args),
    }
}

fn load_session(config: Option<&Path>) -> anyhow::Result<ComparisonSession> {
    let config = match config {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => EngineConfig::default(),
    };
    Ok(ComparisonSession::new(config)?)
}

fn cmd_compare(args: CompareArgs) -> anyhow::Result<()> {
    let session = load_session(args.config.as_deref())?;
    let reference = session
        .load_snapshot(&args.reference)
        .with_context(|| format!("load reference '{}'", args.reference.display()))?;
    let candidate = session
        .load_snapshot(&args.candidate)
        .with_context(|| format!("load candidate '{}'", args.candidate.display()))?;

    let cmp = session.compare(&reference, &candidate)?;
    let summary = &cmp.report.summary;

    eprintln!("total differences: {}", summary.total_differences);
    eprintln!(
        "high: {}  medium: {}  low: {}",
        summary.by_severity.high, summary.by_severity.medium, summary.by_severity.low
    );
    if cmp.is_clean() {
        eprintln!("no differences found");
    } else {
        for (kind, count) in &summary.by_type {
            eprintln!("  {kind}: {count}");
        }
        eprintln!("top differences:");
        for (i, d) in cmp.differences().iter().take(10).enumerate() {
            eprintln!(
                "  {}. [{}] {}",
                i + 1,
                d.severity.as_str().to_uppercase(),
                d.message
            );
        }
    }
    for warning in cmp.verify().warnings {
        eprintln!("warning: {warning}");
    }

    if let Some(out) = &args.out {
        write_json(out, &cmp.report)?;
        eprintln!("wrote {}", out.display());
    }
    if let Some(out) = &args.cells_out {
        write_json(out, &cmp.cell_export())?;
        eprintln!("wrote {}", out.display());
    }

    if args.fail_on_diff && !cmp.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_cells(args: CellsArgs) -> anyhow::Result<()> {
    let session = load_session(args.config.as_deref())?;
    let report = Report::from_path(&args.report)
        .with_context(|| format!("load report '{}'", args.report.display()))?;
    let reference = session
        .load_snapshot(&args.reference)
        .with_context(|| format!("load reference '{}'", args.reference.display()))?;
    let candidate = session
        .load_snapshot(&args.candidate)
        .with_context(|| format!("load candidate '{}'", args.candidate.display()))?;

    let cells = session.rescore(&report, &reference, &candidate)?;
    let (grid, rows) = session.export_extent(&candidate, &cells);
    let export = cells.export(&grid, rows);

    for (tier, count) in tier_histogram(export.values().map(|c| c.score)) {
        eprintln!("{:>12}: {count}", tier.as_str());
    }

    if let Some(out) = &args.out {
        write_json(out, &export)?;
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, value)
        .with_context(|| format!("write json '{}'", path.display()))?;
    w.flush()
        .with_context(|| format!("flush '{}'", path.display()))?;
    Ok(())
}
