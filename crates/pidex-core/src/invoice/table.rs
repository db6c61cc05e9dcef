//! Locating the item table and splitting it into per-item segments.

use regex::Regex;

use super::rules::{TABLE_END, TABLE_START};

/// The text belonging to one item code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSegment<'a> {
    /// The matched item code.
    pub code: &'a str,
    /// Remainder of the code line after the code, then every following line
    /// up to the next code.
    pub lines: Vec<&'a str>,
}

impl<'a> ItemSegment<'a> {
    /// Remainder of the line the code was found on.
    pub fn code_line(&self) -> &'a str {
        self.lines.first().copied().unwrap_or_default()
    }
}

/// Slice of the text between the `Item No.` header and the first terminator
/// after it (`REMARKS`, `BENEFICIARY`, a total line with an amount), or the
/// end of the text.
pub fn table_region(text: &str) -> Option<&str> {
    let start = TABLE_START.find(text)?;
    let rest = &text[start.start()..];
    let after_header = start.end() - start.start();

    let end = TABLE_END
        .find_at(rest, after_header)
        .map_or(rest.len(), |m| m.start());

    Some(&rest[..end])
}

/// Split a table region at every occurrence of the item code pattern.
pub fn item_segments<'a>(region: &'a str, item_code: &Regex) -> Vec<ItemSegment<'a>> {
    let codes: Vec<regex::Match<'a>> = item_code.find_iter(region).collect();

    codes
        .iter()
        .enumerate()
        .map(|(i, code)| {
            let end = codes.get(i + 1).map_or(region.len(), |next| next.start());
            ItemSegment {
                code: code.as_str(),
                lines: region[code.end()..end].split('\n').collect(),
            }
        })
        .collect()
}
