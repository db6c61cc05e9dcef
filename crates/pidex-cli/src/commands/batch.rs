//! Batch processing command for multiple invoice files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, Utc};
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use pidex_core::{FileFailure, InputFile, PidexError};

use super::export::{ExportSummary, OutputFormat, default_export_name, format_records};
use super::{OracleArgs, build_pipeline, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output file (default: pidex_export_<timestamp>.csv in the output directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output directory for the default output file name
    #[arg(short = 'd', long)]
    output_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Also generate a summary CSV next to the output
    #[arg(long)]
    summary: bool,

    #[command(flatten)]
    oracle: OracleArgs,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    let paths: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    if paths.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        paths.len()
    );

    let pipeline = build_pipeline(config, &args.oracle)?;
    let files_processed = paths.len();

    // Unreadable files are reported with the extraction failures.
    let mut read_failures = Vec::new();
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        match InputFile::from_path(path) {
            Ok(file) => files.push(file),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                read_failures.push(FileFailure {
                    file_name: path.display().to_string(),
                    error: PidexError::Io(e),
                });
            }
        }
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("=>-"),
    );

    let mut outcome = pipeline
        .process_batch_with_progress(files, |index, name| {
            pb.set_position(index as u64);
            pb.set_message(name.to_string());
        })
        .await;
    pb.finish_with_message("Complete");

    outcome.failures.extend(read_failures);

    let output_path = resolve_output_path(&args)?;
    let content = format_records(&outcome.records, args.format)?;
    fs::write(&output_path, content)?;
    debug!("Wrote {} record(s) to {}", outcome.records.len(), output_path.display());
    println!(
        "{} {} record(s) written to {}",
        style("✓").green(),
        outcome.records.len(),
        output_path.display()
    );

    if args.summary {
        let summary_path = summary_path(&output_path);
        ExportSummary::from_records(&outcome.records, files_processed)
            .write_csv(&summary_path, Utc::now())?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        files_processed,
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(outcome.succeeded()).green(),
        style(outcome.failures.len()).red()
    );

    if !outcome.failures.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for failure in &outcome.failures {
            println!("  - {}: {}", failure.file_name, failure.error);
        }
    }

    Ok(())
}

fn resolve_output_path(args: &BatchArgs) -> anyhow::Result<PathBuf> {
    if let Some(output) = &args.output {
        return Ok(output.clone());
    }

    let name = default_export_name(Local::now());
    let name = match args.format {
        OutputFormat::Csv => name,
        OutputFormat::Json => name.replace(".csv", ".json"),
        OutputFormat::Text => name.replace(".csv", ".txt"),
    };

    match &args.output_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            Ok(dir.join(name))
        }
        None => Ok(PathBuf::from(name)),
    }
}

/// `<stem>_summary.csv` next to the output file.
fn summary_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("pidex_export");
    output.with_file_name(format!("{stem}_summary.csv"))
}
