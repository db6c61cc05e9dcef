//! Core library for proforma invoice data extraction.
//!
//! This crate provides:
//! - PDF text-layer collection (positioned fragments per page)
//! - Reading-order line reconstruction into a single document text
//! - Field extraction through a remote oracle, with a deterministic
//!   regex/table fallback
//! - Assembly of per-item output records for a batch of files

pub mod assembler;
pub mod error;
pub mod invoice;
pub mod models;
pub mod oracle;
pub mod pdf;
pub mod pipeline;

pub use assembler::RecordAssembler;
pub use error::{ExtractionError, OracleError, PdfError, PidexError, Result};
pub use invoice::{FallbackExtractor, PositionalRowInterpreter, RecordExtractor, RowInterpreter};
pub use models::config::PidexConfig;
pub use models::record::{ExtractionRecord, OutputRecord, RecordField};
pub use oracle::{ApiKey, ChatCompletionOracle, FieldOracle};
pub use pdf::{PageFragments, PdfExtractor, TextFragment};
pub use pipeline::{BatchOutcome, ExtractionSource, FileExtraction, FileFailure, InputFile, Pipeline};
