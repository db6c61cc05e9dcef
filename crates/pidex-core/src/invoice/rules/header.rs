//! Header field extraction: document numbers and bank details.

use regex::Regex;

use super::patterns::{ACCOUNT_NO, BENEFICIARY, NAME_OF_BANK, PI_NO, PO_NO, SC_NO, SWIFT};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::record::{ExtractionRecord, RecordField};

/// Extracts one header field: a label followed by its value.
pub struct LabeledFieldExtractor {
    pattern: &'static Regex,
}

impl LabeledFieldExtractor {
    /// Extractor for a header field, or `None` for per-item fields.
    pub fn for_field(field: RecordField) -> Option<Self> {
        let pattern: &'static Regex = match field {
            RecordField::PiNo => &*PI_NO,
            RecordField::PoNo => &*PO_NO,
            RecordField::ScNo => &*SC_NO,
            RecordField::Swift => &*SWIFT,
            RecordField::Beneficiary => &*BENEFICIARY,
            RecordField::NameOfBank => &*NAME_OF_BANK,
            RecordField::AccountNo => &*ACCOUNT_NO,
            _ => return None,
        };
        Some(Self { pattern })
    }
}

impl FieldExtractor for LabeledFieldExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let value = caps.get(1)?;
                let trimmed = value.as_str().trim();
                if trimmed.is_empty() {
                    return None;
                }
                Some(
                    ExtractionMatch::new(trimmed.to_string())
                        .with_position(value.start(), value.end()),
                )
            })
            .collect()
    }
}

/// Extract all header fields; per-item fields stay empty.
pub fn extract_header(text: &str) -> ExtractionRecord {
    let mut record = ExtractionRecord::default();

    for field in RecordField::HEADER {
        if let Some(found) = LabeledFieldExtractor::for_field(field).and_then(|e| e.extract(text)) {
            record.set(field, found.value);
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pi_no_and_swift() {
        let header = extract_header("P/I No.: PI-1001\nSWIFT: ABCDEFGH");
        assert_eq!(header.pi_no, "PI-1001");
        assert_eq!(header.swift, "ABCDEFGH");
        assert_eq!(header.po_no, "");
    }

    #[test]
    fn test_full_header_block() {
        let text = "PROFORMA INVOICE\n\
                    P/I No.: PI-2024-07 P/O No. PO-5531\n\
                    S/C No: SC/88\n\
                    BENEFICIARY: Ningbo Homeware Co., Ltd.\n\
                    NAME OF THE BANK: Bank of China, Ningbo Branch\n\
                    ACCOUNT No.: 3519 0012\n\
                    SWIFT CODE: BKCHCNBJ92A";

        let header = extract_header(text);
        assert_eq!(header.pi_no, "PI-2024-07");
        assert_eq!(header.po_no, "PO-5531");
        assert_eq!(header.sc_no, "SC/88");
        assert_eq!(header.beneficiary, "Ningbo Homeware Co., Ltd.");
        assert_eq!(header.name_of_bank, "Bank of China, Ningbo Branch");
        assert_eq!(header.account_no, "3519");
        assert_eq!(header.swift, "BKCHCNBJ92A");
        assert_eq!(header.item_no, "");
    }

    #[test]
    fn test_first_match_wins() {
        let extractor = LabeledFieldExtractor::for_field(RecordField::PiNo).unwrap();
        let text = "P/I No. A-1\np/i no. B-2";

        assert_eq!(extractor.extract(text).unwrap().value, "A-1");
        assert_eq!(extractor.extract_all(text).len(), 2);
    }

    #[test]
    fn test_item_fields_have_no_label_extractor() {
        assert!(LabeledFieldExtractor::for_field(RecordField::ItemNo).is_none());
        assert!(LabeledFieldExtractor::for_field(RecordField::Amount).is_none());
    }
}
