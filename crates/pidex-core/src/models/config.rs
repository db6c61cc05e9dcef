//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::error::PidexError;

/// Main configuration for the pidex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PidexConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Oracle configuration.
    pub oracle: OracleConfig,

    /// Fallback extraction configuration.
    pub extraction: ExtractionConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum vertical distance (PDF units) between consecutive fragments
    /// of one line.
    pub line_tolerance: f32,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,

    /// Try the empty password on encrypted documents.
    pub decrypt_with_empty_password: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 5.0,
            max_pages: 0,
            decrypt_with_empty_password: true,
        }
    }
}

/// Remote oracle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Use the oracle when a credential is available.
    pub enabled: bool,

    /// Chat-completions endpoint.
    pub endpoint: String,

    /// Model name sent with each request.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Upper bound on generated tokens.
    pub max_tokens: u32,

    /// Deadline for one oracle call, in seconds.
    pub timeout_secs: u64,

    /// Environment variable holding the credential.
    pub api_key_env: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.1,
            max_tokens: 4096,
            timeout_secs: 60,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl OracleConfig {
    /// Deadline for one oracle call.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

/// Fallback extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Regex for item codes in the item table.
    pub item_code_pattern: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            item_code_pattern: r"\b\d{5}-\d{2}\b".to_string(),
        }
    }
}

impl PidexConfig {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> crate::error::Result<()> {
        let tolerance = self.pdf.line_tolerance;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(PidexError::Config(format!(
                "pdf.line_tolerance must be a positive number, got {tolerance}"
            )));
        }
        if self.oracle.timeout_secs == 0 {
            return Err(PidexError::Config(
                "oracle.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
