//! Common regex patterns for proforma invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

// Currency marker followed by a number ($12.50, US$ 1,250.00, USD12.50, € 9.90)
const CURRENCY_AMOUNT_BODY: &str = r"(?:US\$|\$|\bUSD|\bEUR|€|\bRMB|¥)[ \t]?\d[\d,]*(?:\.\d+)?";

lazy_static! {
    // Document numbers
    pub static ref PI_NO: Regex = Regex::new(
        r"(?i)P/I\s+No\.?\s*:?\s*([^\s]+)"
    ).unwrap();

    pub static ref PO_NO: Regex = Regex::new(
        r"(?i)P/O\s+No\.?\s*:?\s*([^\s]+)"
    ).unwrap();

    pub static ref SC_NO: Regex = Regex::new(
        r"(?i)S/C\s+No\.?\s*:?\s*([^\s]+)"
    ).unwrap();

    // Bank details
    pub static ref SWIFT: Regex = Regex::new(
        r"(?i)SWIFT(?:\s+CODE)?\s*:?\s*([A-Z0-9]+)"
    ).unwrap();

    pub static ref BENEFICIARY: Regex = Regex::new(
        r"(?i)BENEFICIARY\s*:?\s*([^\n\r]+)"
    ).unwrap();

    pub static ref NAME_OF_BANK: Regex = Regex::new(
        r"(?i)NAME\s+OF\s+(?:THE\s+)?BANK\s*:?\s*([^\n\r]+)"
    ).unwrap();

    pub static ref ACCOUNT_NO: Regex = Regex::new(
        r"(?i)ACCOUNT\s+No\.?\s*:?\s*([^\s]+)"
    ).unwrap();

    // Item table boundaries
    pub static ref TABLE_START: Regex = Regex::new(
        r"(?i)\bItem\s*No\b\.?"
    ).unwrap();

    pub static ref TABLE_END: Regex = Regex::new(&format!(
        r"(?im)REMARKS|BENEFICIARY|^[ \t]*(?:GRAND[ \t]+)?TOTAL\b[^\n]*?{CURRENCY_AMOUNT_BODY}"
    )).unwrap();

    // Item codes: five digits, hyphen, two-digit suffix (72692-01)
    pub static ref ITEM_CODE: Regex = Regex::new(
        r"\b\d{5}-\d{2}\b"
    ).unwrap();

    pub static ref CURRENCY_AMOUNT: Regex = Regex::new(
        &format!("(?i){CURRENCY_AMOUNT_BODY}")
    ).unwrap();

    // A number without currency marker (100, 1,200, 12.5)
    pub static ref BARE_NUMBER: Regex = Regex::new(
        r"^\d[\d,]*(?:\.\d+)?$"
    ).unwrap();

    // Unit of measure between quantity and price (PCS, SETS, CTNS)
    pub static ref UNIT_WORD: Regex = Regex::new(
        r"^[A-Za-z]{1,5}\.?$"
    ).unwrap();

    // Packing annotations kept out of item descriptions
    pub static ref ANNOTATION: Regex = Regex::new(
        r"(?i)Serial\s+NO\b|\bG\.\s?W\b|\bN\.\s?W\b|\bTOTAL\b|\bCTNS?\b"
    ).unwrap();

    // Whitespace-delimited tokens
    pub static ref TOKEN: Regex = Regex::new(r"\S+").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_amount_forms() {
        for text in ["$12.50", "$ 1,250.00", "US$9", "USD12.50", "usd 3.00", "€ 9.90", "RMB 70"] {
            assert!(CURRENCY_AMOUNT.is_match(text), "{text}");
        }
        assert!(!CURRENCY_AMOUNT.is_match("127V 100"));
    }

    #[test]
    fn test_table_end_requires_currency_on_total_line() {
        assert!(!TABLE_END.is_match("TOTAL: 10 CTNS"));
        assert!(TABLE_END.is_match("TOTAL: 200 PCS $2,500.00"));
        assert!(TABLE_END.is_match("GRAND TOTAL USD 2,500.00"));
        assert!(TABLE_END.is_match("TOTAL: RMB 500.00"));
        assert!(!TABLE_END.is_match("Total USD"));
        assert!(TABLE_END.is_match("REMARKS: none"));
    }

    #[test]
    fn test_item_code() {
        assert!(ITEM_CODE.is_match("72692-01 coffee maker"));
        assert!(!ITEM_CODE.is_match("7269-01"));
        assert!(!ITEM_CODE.is_match("72692-011"));
    }
}
