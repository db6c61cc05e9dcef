//! Subcommands and the setup they share.

pub mod batch;
pub mod config;
pub mod export;
pub mod process;
pub mod text;

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{debug, info};

use pidex_core::{ApiKey, ChatCompletionOracle, PidexConfig, Pipeline};

/// Oracle options shared by the extracting commands.
#[derive(Args, Debug, Clone)]
pub struct OracleArgs {
    /// Use only the rule-based extractor
    #[arg(long)]
    no_oracle: bool,

    /// API key for the oracle (default: read from the configured environment variable)
    #[arg(long)]
    api_key: Option<String>,
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pidex")
        .join("config.json")
}

/// Load the configuration from `path`, or from the default location when it
/// exists, or fall back to defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<PidexConfig> {
    if let Some(path) = path {
        return Ok(PidexConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading configuration from {}", default_path.display());
        Ok(PidexConfig::from_file(&default_path)?)
    } else {
        Ok(PidexConfig::default())
    }
}

/// Build a pipeline, attaching the oracle when enabled and a key is available.
pub fn build_pipeline(config: PidexConfig, oracle: &OracleArgs) -> anyhow::Result<Pipeline> {
    let oracle_config = config.oracle.clone();
    let pipeline = Pipeline::new(config)?;

    if oracle.no_oracle || !oracle_config.enabled {
        info!("Oracle disabled, using rule-based extraction");
        return Ok(pipeline);
    }

    let api_key = oracle
        .api_key
        .as_deref()
        .map(ApiKey::new)
        .or_else(|| ApiKey::from_env(&oracle_config.api_key_env));

    match api_key {
        Some(key) => {
            let chat = ChatCompletionOracle::new(oracle_config, key)?;
            Ok(pipeline.with_oracle(Box::new(chat)))
        }
        None => {
            info!(
                "No API key given and {} is not set, using rule-based extraction",
                oracle_config.api_key_env
            );
            Ok(pipeline)
        }
    }
}
