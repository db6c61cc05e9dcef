//! Reading-order reconstruction of text lines from positioned fragments.
//!
//! PDF content streams place text runs independently, with no notion of a
//! row. Fragments are clustered into visual lines by their baseline `y`:
//! walking fragments top to bottom, a gap larger than the tolerance between
//! two consecutive fragments starts a new line. The tolerance is a fixed
//! heuristic and does not adapt to font size.

use std::cmp::Ordering;

use tracing::debug;

use super::{PageFragments, Result, TextFragment};
use crate::error::PdfError;

/// A visual line of text: fragments ordered left to right.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub fragments: Vec<TextFragment>,
}

impl Line {
    /// Fragment texts joined by a single space.
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Groups fragments into lines and lines into page and document text.
#[derive(Debug, Clone, Copy)]
pub struct LineReconstructor {
    tolerance: f32,
}

impl LineReconstructor {
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }

    /// Cluster a page's fragments into lines, top to bottom.
    pub fn lines(&self, fragments: &[TextFragment]) -> Vec<Line> {
        let mut sorted: Vec<&TextFragment> = fragments
            .iter()
            .filter(|f| !f.text.trim().is_empty())
            .collect();
        sorted.sort_by(|a, b| {
            b.y.partial_cmp(&a.y)
                .unwrap_or(Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
        });

        let mut lines = Vec::new();
        let mut current: Vec<TextFragment> = Vec::new();
        let mut last_y: Option<f32> = None;

        for fragment in sorted {
            if let Some(y) = last_y {
                if (fragment.y - y).abs() > self.tolerance {
                    lines.push(Self::finish_line(std::mem::take(&mut current)));
                }
            }
            last_y = Some(fragment.y);
            current.push(fragment.clone());
        }

        if !current.is_empty() {
            lines.push(Self::finish_line(current));
        }

        lines
    }

    /// Text of one page: its lines joined by newlines.
    pub fn page_text(&self, fragments: &[TextFragment]) -> String {
        self.lines(fragments)
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text of the whole document: non-empty page texts joined by newlines.
    ///
    /// Fails with [`PdfError::Empty`] when no page yields any text.
    pub fn document_text(&self, pages: &[PageFragments]) -> Result<String> {
        let page_texts: Vec<String> = pages
            .iter()
            .map(|page| self.page_text(&page.fragments))
            .filter(|text| !text.trim().is_empty())
            .collect();

        let text = page_texts.join("\n");
        if text.trim().is_empty() {
            return Err(PdfError::Empty);
        }

        debug!(
            "Reconstructed {} chars of text from {} of {} pages",
            text.len(),
            page_texts.len(),
            pages.len()
        );
        Ok(text)
    }

    fn finish_line(mut fragments: Vec<TextFragment>) -> Line {
        // Fragments within the tolerance band may step down in y while
        // moving left; restore left-to-right order.
        fragments.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
        Line { fragments }
    }
}

impl Default for LineReconstructor {
    fn default() -> Self {
        Self::new(5.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fragment(text: &str, x: f32, y: f32) -> TextFragment {
        TextFragment::new(text, x, y).with_size(40.0, 10.0)
    }

    #[test]
    fn test_groups_fragments_into_lines() {
        let fragments = vec![
            fragment("Next line", 100.0, 680.0),
            fragment("World", 160.0, 700.0),
            fragment("Hello", 100.0, 700.0),
        ];

        let lines = LineReconstructor::default().lines(&fragments);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "Hello World");
        assert_eq!(lines[1].text(), "Next line");
    }

    #[test]
    fn test_tolerance_boundary() {
        let reconstructor = LineReconstructor::default();

        let within = vec![fragment("a", 10.0, 700.0), fragment("b", 20.0, 695.0)];
        assert_eq!(reconstructor.page_text(&within), "a b");

        let beyond = vec![fragment("a", 10.0, 700.0), fragment("b", 20.0, 694.5)];
        assert_eq!(reconstructor.page_text(&beyond), "a\nb");
    }

    #[test]
    fn test_drifting_baseline_chains_with_previous_fragment() {
        // Each step is within tolerance even though the total drift is not.
        let fragments = vec![
            fragment("a", 10.0, 700.0),
            fragment("b", 20.0, 696.0),
            fragment("c", 30.0, 692.0),
        ];
        assert_eq!(LineReconstructor::default().page_text(&fragments), "a b c");
    }

    #[test]
    fn test_line_is_ordered_left_to_right() {
        // Sorted by y first, "left" comes after "right" but shares the line.
        let fragments = vec![fragment("right", 200.0, 700.0), fragment("left", 50.0, 698.0)];
        let lines = LineReconstructor::default().lines(&fragments);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "left right");
    }

    #[test]
    fn test_blank_fragments_are_discarded() {
        let fragments = vec![
            fragment("   ", 10.0, 800.0),
            fragment("text", 10.0, 700.0),
        ];
        let lines = LineReconstructor::default().lines(&fragments);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "text");
    }

    #[test]
    fn test_document_text_joins_non_empty_pages() {
        let pages = vec![
            PageFragments {
                number: 1,
                fragments: vec![fragment("first", 10.0, 700.0)],
            },
            PageFragments {
                number: 2,
                fragments: vec![],
            },
            PageFragments {
                number: 3,
                fragments: vec![fragment("third", 10.0, 700.0)],
            },
        ];

        let text = LineReconstructor::default().document_text(&pages).unwrap();
        assert_eq!(text, "first\nthird");
    }

    #[test]
    fn test_document_without_text_is_empty() {
        let pages = vec![PageFragments {
            number: 1,
            fragments: vec![fragment(" ", 10.0, 700.0)],
        }];
        assert!(matches!(
            LineReconstructor::default().document_text(&pages),
            Err(PdfError::Empty)
        ));
        assert!(matches!(
            LineReconstructor::default().document_text(&[]),
            Err(PdfError::Empty)
        ));
    }
}
