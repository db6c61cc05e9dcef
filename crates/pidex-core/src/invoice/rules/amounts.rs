//! Currency-marked amounts and bare numbers in item rows.

use super::patterns::{BARE_NUMBER, CURRENCY_AMOUNT, UNIT_WORD};
use super::{ExtractionMatch, FieldExtractor};

/// Finds numbers carrying a currency marker (`$12.50`, `USD 1,250.00`).
///
/// Values are returned exactly as printed, marker included.
pub struct CurrencyAmountExtractor;

impl CurrencyAmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CurrencyAmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CurrencyAmountExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        CURRENCY_AMOUNT
            .find_iter(text)
            .map(|m| {
                let value = m.as_str().trim().to_string();
                ExtractionMatch::new(value).with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Check if a token is a plain number such as `100`, `1,200` or `2.5`.
pub fn is_bare_number(token: &str) -> bool {
    BARE_NUMBER.is_match(token)
}

/// Check if a token looks like a unit of measure (`PCS`, `SETS`).
pub fn is_unit_word(token: &str) -> bool {
    UNIT_WORD.is_match(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_all_amounts_in_order() {
        let extractor = CurrencyAmountExtractor::new();
        let found = extractor.extract_all("100 PCS $12.50 US$ 1,250.00");

        let values: Vec<&str> = found.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(values, vec!["$12.50", "US$ 1,250.00"]);
        assert_eq!(found[0].position, Some((8, 14)));
    }

    #[test]
    fn test_bare_number() {
        assert!(is_bare_number("100"));
        assert!(is_bare_number("1,200"));
        assert!(is_bare_number("2.5"));
        assert!(!is_bare_number("127V"));
        assert!(!is_bare_number("$12"));
        assert!(!is_bare_number("72692-01"));
    }

    #[test]
    fn test_unit_word() {
        assert!(is_unit_word("PCS"));
        assert!(is_unit_word("sets"));
        assert!(is_unit_word("pcs."));
        assert!(!is_unit_word("100"));
        assert!(!is_unit_word("coffee1"));
    }
}
