//! Per-file and batch processing: PDF bytes in, output records out.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::assembler::RecordAssembler;
use crate::error::{OracleError, PidexError, Result};
use crate::invoice::{FallbackExtractor, RecordExtractor};
use crate::models::config::PidexConfig;
use crate::models::record::{ExtractionRecord, OutputRecord};
use crate::oracle::FieldOracle;
use crate::pdf::lines::LineReconstructor;
use crate::pdf::{FragmentCollector, PdfExtractor};

/// A named PDF document to process.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Read a file from disk, named after its file name.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, data })
    }
}

/// Which extractor produced a file's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    Oracle,
    Fallback,
}

impl std::fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionSource::Oracle => write!(f, "oracle"),
            ExtractionSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// The records extracted from one file.
#[derive(Debug, Clone)]
pub struct FileExtraction {
    pub file_name: String,
    pub source: ExtractionSource,
    pub records: Vec<OutputRecord>,
    pub processing_time_ms: u64,
}

/// A file that produced no records.
#[derive(Debug)]
pub struct FileFailure {
    pub file_name: String,
    pub error: PidexError,
}

/// Result of a batch: records of the files that succeeded, in input order,
/// and one failure per file that did not.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub records: Vec<OutputRecord>,
    pub failures: Vec<FileFailure>,
    succeeded: usize,
}

impl BatchOutcome {
    /// Number of files that produced records.
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }
}

/// Extraction pipeline: collect, reconstruct, extract, assemble.
pub struct Pipeline {
    collector: Box<dyn FragmentCollector>,
    lines: LineReconstructor,
    fallback: Box<dyn RecordExtractor>,
    oracle: Option<Box<dyn FieldOracle>>,
    oracle_timeout: Duration,
    assembler: RecordAssembler,
}

impl Pipeline {
    /// Create a pipeline without an oracle; every file uses the fallback.
    pub fn new(config: PidexConfig) -> Result<Self> {
        config.validate()?;
        let fallback = FallbackExtractor::from_config(&config.extraction)?;

        Ok(Self {
            lines: LineReconstructor::new(config.pdf.line_tolerance),
            collector: Box::new(PdfExtractor::new(config.pdf)),
            fallback: Box::new(fallback),
            oracle: None,
            oracle_timeout: config.oracle.timeout(),
            assembler: RecordAssembler::new(),
        })
    }

    /// Attach an oracle, tried before the fallback for every file.
    pub fn with_oracle(mut self, oracle: Box<dyn FieldOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Override the deadline for one oracle call.
    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    /// Reconstructed document text of a PDF.
    pub fn document_text(&self, data: &[u8]) -> Result<String> {
        let pages = self.collector.collect(data)?;
        Ok(self.lines.document_text(&pages)?)
    }

    /// Process one file.
    ///
    /// Fails only when the PDF cannot be read or has no text; oracle problems
    /// are absorbed by the fallback, so a successful result always carries at
    /// least one record.
    pub async fn process_file(&self, name: &str, data: &[u8]) -> Result<FileExtraction> {
        let start = Instant::now();
        info!("Processing {}", name);

        let text = self.document_text(data)?;
        debug!("{}: {} chars of text", name, text.len());

        let (records, source) = self.extract_records(&text).await;
        let records = self.assembler.assemble(records, name);

        let processing_time_ms = start.elapsed().as_millis() as u64;
        debug!(
            "{}: {} record(s) via {} in {}ms",
            name,
            records.len(),
            source,
            processing_time_ms
        );

        Ok(FileExtraction {
            file_name: name.to_string(),
            source,
            records,
            processing_time_ms,
        })
    }

    /// Process files one after another, in input order.
    ///
    /// A failing file is reported in [`BatchOutcome::failures`] and does not
    /// stop the batch.
    pub async fn process_batch(&self, files: Vec<InputFile>) -> BatchOutcome {
        self.process_batch_with_progress(files, |_, _| {}).await
    }

    /// Like [`Pipeline::process_batch`], calling `progress` with the index and
    /// name of each file before it is processed.
    pub async fn process_batch_with_progress<F>(
        &self,
        files: Vec<InputFile>,
        mut progress: F,
    ) -> BatchOutcome
    where
        F: FnMut(usize, &str),
    {
        let mut outcome = BatchOutcome::default();

        for (index, file) in files.into_iter().enumerate() {
            progress(index, &file.name);

            match self.process_file(&file.name, &file.data).await {
                Ok(extraction) => {
                    outcome.succeeded += 1;
                    outcome.records.extend(extraction.records);
                }
                Err(error) => {
                    warn!("Failed to process {}: {}", file.name, error);
                    outcome.failures.push(FileFailure {
                        file_name: file.name,
                        error,
                    });
                }
            }
        }

        info!(
            "Batch finished: {} record(s), {} failed file(s)",
            outcome.records.len(),
            outcome.failures.len()
        );
        outcome
    }

    async fn extract_records(&self, text: &str) -> (Vec<ExtractionRecord>, ExtractionSource) {
        if let Some(oracle) = &self.oracle {
            match self.call_oracle(oracle.as_ref(), text).await {
                Ok(records) => return (records, ExtractionSource::Oracle),
                Err(e) => warn!("Oracle {} failed, using fallback: {}", oracle.name(), e),
            }
        }

        (self.fallback.extract(text), ExtractionSource::Fallback)
    }

    async fn call_oracle(
        &self,
        oracle: &dyn FieldOracle,
        text: &str,
    ) -> std::result::Result<Vec<ExtractionRecord>, OracleError> {
        let records = tokio::time::timeout(self.oracle_timeout, oracle.extract(text))
            .await
            .map_err(|_| OracleError::Timeout(self.oracle_timeout))??;

        if records.is_empty() {
            return Err(OracleError::NoRecords);
        }
        Ok(records)
    }
}
