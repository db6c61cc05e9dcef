//! Process command - extract records from a single invoice PDF.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use pidex_core::InputFile;

use super::export::{OutputFormat, format_records};
use super::{OracleArgs, build_pipeline, load_config};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    #[command(flatten)]
    oracle: OracleArgs,

    /// Show which extractor produced the records and how long it took
    #[arg(long)]
    show_source: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if extension != "pdf" {
        anyhow::bail!("Unsupported file format: {}", extension);
    }

    info!("Processing file: {}", args.input.display());

    let pipeline = build_pipeline(config, &args.oracle)?;
    let file = InputFile::from_path(&args.input)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(format!("Extracting {}...", file.name));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = pipeline.process_file(&file.name, &file.data).await;
    pb.finish_and_clear();
    let extraction = result?;

    let output = format_records(&extraction.records, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_source {
        println!();
        println!(
            "{} {} record(s) via {}",
            style("ℹ").blue(),
            extraction.records.len(),
            extraction.source
        );
        println!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            extraction.processing_time_ms
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
