//! Deterministic rule-based record extraction.

use std::time::Instant;

use regex::Regex;
use tracing::debug;

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::record::ExtractionRecord;

use super::RecordExtractor;
use super::row::{PositionalRowInterpreter, RowInterpreter, RowValues};
use super::rules::{ANNOTATION, CURRENCY_AMOUNT, ITEM_CODE, extract_header};
use super::table::{ItemSegment, item_segments, table_region};

/// Rebuilds invoice records from document text with fixed patterns.
///
/// Header fields come from labeled patterns over the whole text. Items come
/// from the table after the `Item No.` header: every item code opens one
/// record, and the numbers on its row are mapped by a [`RowInterpreter`].
pub struct FallbackExtractor {
    item_code: Regex,
    rows: Box<dyn RowInterpreter>,
}

impl FallbackExtractor {
    /// Create an extractor with the default item code pattern.
    pub fn new() -> Self {
        Self {
            item_code: ITEM_CODE.clone(),
            rows: Box::new(PositionalRowInterpreter),
        }
    }

    /// Create an extractor with the item code pattern from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let item_code = Regex::new(&config.item_code_pattern).map_err(|e| {
            ExtractionError::InvalidPattern {
                name: "item_code_pattern".to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            item_code,
            ..Self::new()
        })
    }

    /// Replace the row interpreter for layouts with a different column order.
    pub fn with_row_interpreter(mut self, rows: Box<dyn RowInterpreter>) -> Self {
        self.rows = rows;
        self
    }

    fn item_record(&self, segment: &ItemSegment<'_>, header: &ExtractionRecord) -> ExtractionRecord {
        let item_line = segment
            .lines
            .iter()
            .position(|line| CURRENCY_AMOUNT.is_match(line))
            .unwrap_or(0);
        let values = self.rows.interpret(segment.lines[item_line]);

        ExtractionRecord {
            item_no: segment.code.to_string(),
            description: Self::description(segment, item_line, &values),
            quantity: values.quantity,
            unit_price: values.unit_price,
            amount: values.amount,
            ..Default::default()
        }
        .with_header(header)
    }

    fn description(segment: &ItemSegment<'_>, item_line: usize, values: &RowValues) -> String {
        segment
            .lines
            .iter()
            .enumerate()
            .find_map(|(i, line)| {
                let mut text: &str = line;
                if i == item_line {
                    if let Some(start) = values.columns_start {
                        text = text.get(..start).unwrap_or(text);
                    }
                }
                if let Some(annotation) = ANNOTATION.find(text) {
                    text = &text[..annotation.start()];
                }
                let text = clean_fragment(text);

                let usable = if i == 0 {
                    !text.is_empty()
                } else {
                    text.chars().any(char::is_alphabetic)
                };
                usable.then(|| text.to_string())
            })
            .unwrap_or_default()
    }
}

impl Default for FallbackExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordExtractor for FallbackExtractor {
    fn extract(&self, text: &str) -> Vec<ExtractionRecord> {
        let start = Instant::now();
        let header = extract_header(text);

        let segments = table_region(text)
            .map(|region| item_segments(region, &self.item_code))
            .unwrap_or_default();

        let records: Vec<ExtractionRecord> = if segments.is_empty() {
            debug!("No item table found, emitting header-only record");
            vec![header]
        } else {
            segments
                .iter()
                .map(|segment| self.item_record(segment, &header))
                .collect()
        };

        debug!(
            "Fallback extracted {} record(s) in {:?}",
            records.len(),
            start.elapsed()
        );
        records
    }
}

/// Strip surrounding whitespace and column separators.
fn clean_fragment(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, '|' | ',' | ';' | ':' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TWO_ITEMS: &str = r#"
        PROFORMA INVOICE
        P/I No.: PI-1001  Date: 2024-05-01
        P/O No. PO-77
        Item No. Description Quantity Unit Price Amount
        72692-01 Coffee maker 127V 100 $12.50 $1,250.00
        Serial NO.: CM-01 G.W. 12KG
        72692-02 Coffee maker 220V 200 $13.00 $2,600.00
        TOTAL: 300 $3,850.00
        BENEFICIARY: Ningbo Homeware Co., Ltd.
        NAME OF THE BANK: Bank of China
        ACCOUNT No.: 35190012
        SWIFT: BKCHCNBJ
    "#;

    #[test]
    fn test_two_items_in_code_order() {
        let records = FallbackExtractor::new().extract(TWO_ITEMS);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].item_no, "72692-01");
        assert_eq!(records[0].description, "Coffee maker 127V");
        assert_eq!(records[0].quantity, "100");
        assert_eq!(records[0].unit_price, "$12.50");
        assert_eq!(records[0].amount, "$1,250.00");

        assert_eq!(records[1].item_no, "72692-02");
        assert_eq!(records[1].description, "Coffee maker 220V");
        assert_eq!(records[1].quantity, "200");
        assert_eq!(records[1].amount, "$2,600.00");

        for record in &records {
            assert_eq!(record.pi_no, "PI-1001");
            assert_eq!(record.po_no, "PO-77");
            assert_eq!(record.beneficiary, "Ningbo Homeware Co., Ltd.");
            assert_eq!(record.name_of_bank, "Bank of China");
            assert_eq!(record.account_no, "35190012");
            assert_eq!(record.swift, "BKCHCNBJ");
        }
    }

    #[test]
    fn test_deterministic() {
        let extractor = FallbackExtractor::new();
        assert_eq!(extractor.extract(TWO_ITEMS), extractor.extract(TWO_ITEMS));
    }

    #[test]
    fn test_no_codes_and_no_headers_yields_one_empty_record() {
        let records = FallbackExtractor::new().extract("just some unrelated words");
        assert_eq!(records, vec![ExtractionRecord::default()]);
    }

    #[test]
    fn test_table_without_codes_keeps_header() {
        let text = "P/I No.: PI-9\nItem No. Description\nsomething $1.00";
        let records = FallbackExtractor::new().extract(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pi_no, "PI-9");
        assert_eq!(records[0].item_no, "");
    }

    #[test]
    fn test_product_name_on_following_line() {
        let text = "Item No. Description Qty Price Amount\n\
                    72692-01\n\
                    Electric kettle 1.7L\n\
                    50 PCS US$ 7.00 US$ 350.00\n\
                    REMARKS: none";
        let records = FallbackExtractor::new().extract(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "Electric kettle 1.7L");
        assert_eq!(records[0].quantity, "50");
        assert_eq!(records[0].unit_price, "US$ 7.00");
        assert_eq!(records[0].amount, "US$ 350.00");
    }

    #[test]
    fn test_annotations_are_not_descriptions() {
        let text = "Item No.\n\
                    72692-01 | Serial NO.: 88 G.W. 3KG\n\
                    N.W. 2KG\n\
                    Toaster 2 slots 10 $5.00 $50.00\n\
                    TOTAL: 10 $50.00";
        let records = FallbackExtractor::new().extract(text);

        assert_eq!(records[0].description, "Toaster 2 slots");
        assert!(!records[0].description.contains("Serial"));
    }

    #[test]
    fn test_custom_item_code_pattern() {
        let config = ExtractionConfig {
            item_code_pattern: r"\bSKU-\d+\b".to_string(),
        };
        let extractor = FallbackExtractor::from_config(&config).unwrap();
        let records = extractor.extract("Item No.\nSKU-12 Mug 6 $2.00 $12.00\nSKU-13 Cup 4 $1.00 $4.00");

        let codes: Vec<&str> = records.iter().map(|r| r.item_no.as_str()).collect();
        assert_eq!(codes, vec!["SKU-12", "SKU-13"]);
    }

    #[test]
    fn test_invalid_item_code_pattern() {
        let config = ExtractionConfig {
            item_code_pattern: "(unclosed".to_string(),
        };
        assert!(matches!(
            FallbackExtractor::from_config(&config),
            Err(ExtractionError::InvalidPattern { .. })
        ));
    }

    struct PriceOnly;

    impl RowInterpreter for PriceOnly {
        fn interpret(&self, row: &str) -> RowValues {
            RowValues {
                unit_price: row.trim().to_string(),
                ..Default::default()
            }
        }
    }

    struct OutOfRange;

    impl RowInterpreter for OutOfRange {
        fn interpret(&self, _row: &str) -> RowValues {
            RowValues {
                columns_start: Some(usize::MAX),
                ..Default::default()
            }
        }
    }

    #[test]
    fn test_out_of_range_columns_start_keeps_whole_line() {
        let extractor = FallbackExtractor::new().with_row_interpreter(Box::new(OutOfRange));
        let records = extractor.extract("Item No.\n72692-01 Kettle");
        assert_eq!(records[0].description, "Kettle");
    }

    #[test]
    fn test_total_column_header_keeps_items() {
        let text = "Item No. Description Qty Unit Price\nTotal USD\n\
                    72692-01 Kettle 5 $1.00 $5.00\n\
                    72692-02 Toaster 2 $3.00 $6.00";
        let records = FallbackExtractor::new().extract(text);

        let codes: Vec<&str> = records.iter().map(|r| r.item_no.as_str()).collect();
        assert_eq!(codes, vec!["72692-01", "72692-02"]);
        assert_eq!(records[0].description, "Kettle");
        assert_eq!(records[1].unit_price, "$3.00");
    }

    #[test]
    fn test_rmb_total_is_not_a_unit_price() {
        let records = FallbackExtractor::new().extract("Item No.\n72692-01 Kettle\nTOTAL: RMB 500.00");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "Kettle");
        assert_eq!(records[0].unit_price, "");
    }

    #[test]
    fn test_pluggable_row_interpreter() {
        let extractor = FallbackExtractor::new().with_row_interpreter(Box::new(PriceOnly));
        let records = extractor.extract("Item No.\n72692-01 $3.00");
        assert_eq!(records[0].unit_price, "$3.00");
        assert_eq!(records[0].quantity, "");
    }
}
