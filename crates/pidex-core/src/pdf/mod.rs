//! PDF processing module.

mod extractor;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod lines;

pub use extractor::PdfExtractor;
pub use lines::{Line, LineReconstructor};

use serde::Serialize;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A run of text placed on a page, in PDF user-space coordinates
/// (origin bottom-left, `y` grows upwards).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextFragment {
    /// Decoded text.
    pub text: String,
    /// X position of the run's origin.
    pub x: f32,
    /// Y position of the run's baseline.
    pub y: f32,
    /// Advance width of the run.
    pub width: f32,
    /// Effective font size.
    pub height: f32,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Text fragments of a single page.
#[derive(Debug, Clone, Default)]
pub struct PageFragments {
    /// Page number (1-indexed).
    pub number: u32,
    /// Fragments in content-stream order.
    pub fragments: Vec<TextFragment>,
}

/// Trait for turning PDF bytes into positioned text fragments.
pub trait FragmentCollector: Send + Sync {
    /// Collect the fragments of every page, in page order.
    ///
    /// Fails only when the document itself cannot be read; unreadable pages
    /// come back with no fragments.
    fn collect(&self, data: &[u8]) -> Result<Vec<PageFragments>>;
}
