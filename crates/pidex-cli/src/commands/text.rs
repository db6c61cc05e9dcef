//! Text command - print the reconstructed text of a PDF.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use pidex_core::Pipeline;

use super::load_config;

/// Arguments for the text command.
#[derive(Args)]
pub struct TextArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: TextArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let pipeline = Pipeline::new(config)?;

    let data = fs::read(&args.input)?;
    let text = pipeline.document_text(&data)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &text)?;
        println!(
            "{} Text written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", text);
    }

    Ok(())
}
