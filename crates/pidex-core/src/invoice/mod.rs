//! Rule-based invoice record extraction.

mod parser;
pub mod row;
pub mod rules;
pub mod table;

pub use parser::FallbackExtractor;
pub use row::{PositionalRowInterpreter, RowInterpreter, RowValues};

use crate::models::record::ExtractionRecord;

/// Trait for extractors that turn document text into invoice records.
pub trait RecordExtractor: Send + Sync {
    /// Extract one record per invoice item.
    ///
    /// Never returns an empty list: a document without recognizable items
    /// yields a single record carrying only its header fields.
    fn extract(&self, text: &str) -> Vec<ExtractionRecord>;
}
