//! Error types for the pidex-core library.

use std::time::Duration;

use thiserror::Error;

/// Main error type for the pidex library.
#[derive(Error, Debug)]
pub enum PidexError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Oracle call error.
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    /// Fallback extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PidexError {
    /// Whether this error stops processing of the file it was raised for.
    ///
    /// Only unreadable and text-less documents are fatal; page and oracle
    /// failures are absorbed inside the pipeline.
    pub fn is_fatal_for_file(&self) -> bool {
        matches!(self, PidexError::Pdf(e) if e.is_fatal())
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF bytes.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and the empty password does not open it.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The document has no extractable text layer.
    #[error("no text could be extracted; the PDF may be image-only or protected")]
    Empty,

    /// A single page could not be read.
    #[error("failed to process page {page}: {reason}")]
    Page { page: u32, reason: String },
}

impl PdfError {
    /// Unreadable and empty documents abort the file; page errors do not.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PdfError::Page { .. })
    }
}

/// Errors related to the remote field-extraction oracle.
#[derive(Error, Debug)]
pub enum OracleError {
    /// The request could not be sent or the response body not read.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response carried no content.
    #[error("empty response")]
    EmptyResponse,

    /// The response content is not a recognizable record payload.
    #[error("unparseable response: {0}")]
    Decode(String),

    /// The payload decoded to zero records.
    #[error("response contained no records")]
    NoRecords,

    /// The call did not finish before the deadline.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The oracle is misconfigured (e.g. invalid credential header).
    #[error("oracle misconfigured: {0}")]
    Config(String),
}

/// Errors related to fallback field extraction setup.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A configured pattern is not a valid regular expression.
    #[error("invalid pattern for {name}: {reason}")]
    InvalidPattern { name: String, reason: String },
}

/// Result type for the pidex library.
pub type Result<T> = std::result::Result<T, PidexError>;
