//! Legacy Alias Generator CLI
//!
//! Regenerates the legacy packages forwarding the well-known schema types
//! to their canonical packages. Prints a diff against the files on disk by
//! default; `--execute` writes them in place.
//!
//! Usage:
//!   generate-alias --root /path/to/legacy-protobuf
//!   generate-alias --root /path/to/legacy-protobuf --execute

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use legacy_descriptor::alias::{self, AliasReport, FileStatus, Mode};
use legacy_descriptor::config::{AliasConfig, OutputFormat};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "generate-alias")]
#[command(about = "Regenerate legacy alias packages for the well-known schema files")]
struct Cli {
    /// Write generated files to destination
    #[arg(long)]
    execute: bool,

    /// Destination root (default: from config)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Config file layered over the default locations
    #[arg(short, long)]
    config: Option<String>,

    /// Output format (text, json)
    #[arg(short, long)]
    format: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AliasConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    let root = cli.root.unwrap_or_else(|| config.output_root());
    let settings = config.run_settings(cli.execute, cli.format.as_deref())?;
    let mode = settings.mode;

    let targets = alias::well_known_targets();
    let files = alias::emit(&targets);
    tracing::info!(targets = targets.len(), root = %root.display(), ?mode, "generating alias files");

    let report = alias::write_outputs(&root, &config.output.strip_prefix, &files, mode)
        .with_context(|| format!("writing outputs under {}", root.display()))?;

    match settings.format {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => print_text_report(&report),
    }
    Ok(())
}

fn print_text_report(report: &AliasReport) {
    for entry in &report.files {
        match report.mode {
            Mode::Apply => println!("# {}", entry.path.display()),
            Mode::Preview => {
                if let Some(diff) = &entry.diff {
                    print!("{diff}");
                }
            }
        }
    }

    let changed = report
        .files
        .iter()
        .filter(|f| f.status != FileStatus::Unchanged)
        .count();
    if !report.has_changes() {
        eprintln!("\n✅ {} alias files up to date", report.files.len());
    } else if report.mode == Mode::Preview {
        eprintln!("\n⚠️  {changed} of {} alias files differ (rerun with --execute to write)", report.files.len());
    } else {
        eprintln!("\n✅ Wrote {changed} alias files");
    }
}
