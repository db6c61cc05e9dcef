//! Rule-based field extractors for proforma invoices.

pub mod amounts;
pub mod header;
pub mod patterns;

pub use amounts::{CurrencyAmountExtractor, is_bare_number, is_unit_word};
pub use header::{LabeledFieldExtractor, extract_header};
pub use patterns::*;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// An extracted value together with where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in source text.
    pub position: Option<(usize, usize)>,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            position: None,
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    /// Start offset, or 0 when unknown.
    pub fn start(&self) -> usize {
        self.position.map_or(0, |(start, _)| start)
    }
}
