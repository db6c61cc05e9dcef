//! Positioned text extraction from PDF content streams using lopdf.

use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::lines::LineReconstructor;
use super::{FragmentCollector, PageFragments, Result, TextFragment};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Glyph width used when a font carries no `/Widths` table, in text-space
/// units per unit of font size.
const DEFAULT_GLYPH_WIDTH: f32 = 0.5;

/// PDF fragment collector using lopdf.
pub struct PdfExtractor {
    config: PdfConfig,
}

impl PdfExtractor {
    /// Create a new extractor with the given configuration.
    pub fn new(config: PdfConfig) -> Self {
        Self { config }
    }

    /// Get the extractor configuration.
    pub fn config(&self) -> &PdfConfig {
        &self.config
    }

    /// Collect fragments and reconstruct the document text in one step.
    pub fn extract_text(&self, data: &[u8]) -> Result<String> {
        let pages = self.collect(data)?;
        LineReconstructor::new(self.config.line_tolerance).document_text(&pages)
    }

    fn load(&self, data: &[u8]) -> Result<Document> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if !self.config.decrypt_with_empty_password || doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        Ok(doc)
    }

    fn page_fragments(&self, doc: &Document, page_id: ObjectId, page: u32) -> Result<Vec<TextFragment>> {
        let content_data = doc.get_page_content(page_id).map_err(|e| PdfError::Page {
            page,
            reason: e.to_string(),
        })?;
        let content = Content::decode(&content_data).map_err(|e| PdfError::Page {
            page,
            reason: e.to_string(),
        })?;

        let fonts = doc.get_page_fonts(page_id).unwrap_or_default();
        let mut walker = ContentWalker::new(doc, &fonts);
        for op in &content.operations {
            walker.apply(&op.operator, &op.operands);
        }

        trace!("Page {}: {} fragments", page, walker.fragments.len());
        Ok(walker.fragments)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new(PdfConfig::default())
    }
}

impl FragmentCollector for PdfExtractor {
    fn collect(&self, data: &[u8]) -> Result<Vec<PageFragments>> {
        let doc = self.load(data)?;
        let pages = doc.get_pages();
        debug!("Loaded PDF with {} pages", pages.len());

        let limit = match self.config.max_pages {
            0 => usize::MAX,
            n => n,
        };

        let mut result = Vec::with_capacity(pages.len().min(limit));
        for (&number, &page_id) in pages.iter().take(limit) {
            let fragments = match self.page_fragments(&doc, page_id, number) {
                Ok(fragments) => fragments,
                Err(e) => {
                    warn!("Skipping page: {}", e);
                    Vec::new()
                }
            };
            result.push(PageFragments { number, fragments });
        }

        Ok(result)
    }
}

/// Font metrics needed to advance the text position.
struct FontMetrics {
    first_char: u32,
    widths: Vec<f32>,
    two_byte: bool,
}

impl FontMetrics {
    fn from_dict(doc: &Document, font: &Dictionary) -> Self {
        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0)
            .max(0) as u32;

        let widths = font
            .get(b"Widths")
            .ok()
            .and_then(|o| doc.dereference(o).ok())
            .and_then(|(_, o)| o.as_array().ok())
            .map(|arr| arr.iter().map(|w| get_number(w).unwrap_or(0.0) / 1000.0).collect())
            .unwrap_or_default();

        let two_byte = font
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|name| name == b"Type0");

        Self {
            first_char,
            widths,
            two_byte,
        }
    }

    fn glyph_width(&self, code: u32) -> f32 {
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .unwrap_or(DEFAULT_GLYPH_WIDTH)
    }
}

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Text state machine over the operators of one content stream.
struct ContentWalker<'a> {
    doc: &'a Document,
    fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>,
    metrics: BTreeMap<Vec<u8>, FontMetrics>,
    font: Vec<u8>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
    text_matrix: [f32; 6],
    line_matrix: [f32; 6],
    in_text_block: bool,
    fragments: Vec<TextFragment>,
}

impl<'a> ContentWalker<'a> {
    fn new(doc: &'a Document, fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        Self {
            doc,
            fonts,
            metrics: BTreeMap::new(),
            font: Vec::new(),
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            in_text_block: false,
            fragments: Vec::new(),
        }
    }

    fn apply(&mut self, operator: &str, operands: &[Object]) {
        match operator {
            "BT" => {
                self.in_text_block = true;
                self.text_matrix = IDENTITY;
                self.line_matrix = IDENTITY;
            }
            "ET" => self.in_text_block = false,
            "Tf" => {
                if let [name, size, ..] = operands {
                    if let Ok(name) = name.as_name() {
                        self.font = name.to_vec();
                        if !self.metrics.contains_key(name) {
                            if let Some(dict) = self.fonts.get(name) {
                                self.metrics
                                    .insert(name.to_vec(), FontMetrics::from_dict(self.doc, dict));
                            }
                        }
                    }
                    self.font_size = get_number(size).unwrap_or(self.font_size);
                }
            }
            "Tc" => self.char_spacing = first_number(operands).unwrap_or(0.0),
            "Tw" => self.word_spacing = first_number(operands).unwrap_or(0.0),
            "Tz" => self.horizontal_scale = first_number(operands).unwrap_or(100.0) / 100.0,
            "TL" => self.leading = first_number(operands).unwrap_or(0.0),
            "Td" | "TD" => {
                if let [tx, ty, ..] = operands {
                    let tx = get_number(tx).unwrap_or(0.0);
                    let ty = get_number(ty).unwrap_or(0.0);
                    if operator == "TD" {
                        self.leading = -ty;
                    }
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                if operands.len() >= 6 {
                    for (i, operand) in operands.iter().take(6).enumerate() {
                        self.text_matrix[i] = get_number(operand).unwrap_or(IDENTITY[i]);
                    }
                    self.line_matrix = self.text_matrix;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "'" => {
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "\"" => {
                if let [aw, ac, Object::String(bytes, _), ..] = operands {
                    self.word_spacing = get_number(aw).unwrap_or(0.0);
                    self.char_spacing = get_number(ac).unwrap_or(0.0);
                    self.next_line();
                    self.show(bytes);
                }
            }
            "TJ" => {
                if let Some(Ok(items)) = operands.first().map(Object::as_array) {
                    self.show_array(items);
                }
            }
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        let m = &mut self.line_matrix;
        m[4] += tx * m[0] + ty * m[2];
        m[5] += tx * m[1] + ty * m[3];
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.move_line(0.0, -leading);
    }

    fn show(&mut self, bytes: &[u8]) {
        if !self.in_text_block {
            return;
        }
        let text = self.decode(bytes);
        let advance = self.advance(bytes);
        self.push_fragment(text, advance);
    }

    fn show_array(&mut self, items: &[Object]) {
        if !self.in_text_block {
            return;
        }
        let mut text = String::new();
        let mut advance = 0.0;
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    text.push_str(&self.decode(bytes));
                    advance += self.advance(bytes);
                }
                other => {
                    if let Some(adjust) = get_number(other) {
                        advance -= adjust / 1000.0 * self.font_size * self.horizontal_scale;
                    }
                }
            }
        }
        self.push_fragment(text, advance);
    }

    /// Record a fragment at the current position and move past it.
    fn push_fragment(&mut self, text: String, advance: f32) {
        let m = self.text_matrix;
        let scale_x = (m[0] * m[0] + m[1] * m[1]).sqrt();
        let scale_y = (m[2] * m[2] + m[3] * m[3]).sqrt();

        if !text.trim().is_empty() {
            self.fragments.push(
                TextFragment::new(text, m[4], m[5])
                    .with_size(advance * scale_x, self.font_size * scale_y),
            );
        }

        self.text_matrix[4] += advance * m[0];
        self.text_matrix[5] += advance * m[1];
    }

    /// Horizontal advance of a shown string, in text space.
    fn advance(&self, bytes: &[u8]) -> f32 {
        let metrics = self.metrics.get(&self.font);
        let two_byte = metrics.is_some_and(|m| m.two_byte);

        let codes: Vec<u32> = if two_byte {
            bytes
                .chunks(2)
                .map(|c| c.iter().fold(0u32, |acc, b| (acc << 8) | *b as u32))
                .collect()
        } else {
            bytes.iter().map(|b| *b as u32).collect()
        };

        codes
            .iter()
            .map(|&code| {
                let glyph = metrics.map_or(DEFAULT_GLYPH_WIDTH, |m| m.glyph_width(code));
                let word = if !two_byte && code == 32 { self.word_spacing } else { 0.0 };
                (glyph * self.font_size + self.char_spacing + word) * self.horizontal_scale
            })
            .sum()
    }

    fn decode(&self, bytes: &[u8]) -> String {
        if let Some(font_dict) = self.fonts.get(&self.font) {
            if let Ok(encoding) = font_dict.get_font_encoding(self.doc) {
                if let Ok(text) = Document::decode_text(&encoding, bytes) {
                    return text;
                }
            }
        }

        if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
            let utf16: Vec<u16> = bytes[2..]
                .chunks_exact(2)
                .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
                .collect();
            return String::from_utf16_lossy(&utf16);
        }

        // Latin-1
        bytes.iter().map(|&b| b as char).collect()
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn first_number(operands: &[Object]) -> Option<f32> {
    operands.first().and_then(get_number)
}
