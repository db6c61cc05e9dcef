//! Interpretation of the numeric columns of an item row.
//!
//! Item tables carry no per-cell labels once flattened to text, so the
//! meaning of each number is inferred from its position. The mapping depends
//! on the column order of the source layout and is kept behind
//! [`RowInterpreter`] so other layouts can plug in their own.

use super::rules::{CurrencyAmountExtractor, FieldExtractor, TOKEN, is_bare_number, is_unit_word};

/// Numeric columns read from one item row, verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowValues {
    pub quantity: String,
    pub unit_price: String,
    pub amount: String,
    /// Byte offset in the row where the numeric columns begin; text before
    /// it belongs to the code and description columns.
    pub columns_start: Option<usize>,
}

impl RowValues {
    /// Check if the row carried any numeric column.
    pub fn is_empty(&self) -> bool {
        self.columns_start.is_none()
    }
}

/// Maps the numbers of a row to quantity, unit price and amount.
pub trait RowInterpreter: Send + Sync {
    fn interpret(&self, row: &str) -> RowValues;
}

/// Column order `… quantity [unit] unit-price … amount`.
///
/// The unit price is the first currency-marked number, the amount is the last
/// one when the row has more than one, and the quantity is the bare number
/// right before the unit price (a single unit word such as `PCS` may sit in
/// between).
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalRowInterpreter;

impl RowInterpreter for PositionalRowInterpreter {
    fn interpret(&self, row: &str) -> RowValues {
        let amounts = CurrencyAmountExtractor::new().extract_all(row);
        let Some(first) = amounts.first() else {
            return RowValues::default();
        };
        let price_start = first.start();

        let mut values = RowValues {
            unit_price: first.value.clone(),
            columns_start: Some(price_start),
            ..Default::default()
        };
        if let Some(last) = amounts.last().filter(|_| amounts.len() > 1) {
            values.amount = last.value.clone();
        }

        let before: Vec<regex::Match> = TOKEN
            .find_iter(&row[..price_start])
            .collect();
        let quantity = match before.as_slice() {
            [.., number, unit] if is_unit_word(unit.as_str()) && is_bare_number(number.as_str()) => {
                Some(number)
            }
            [.., number] if is_bare_number(number.as_str()) => Some(number),
            _ => None,
        };
        if let Some(quantity) = quantity {
            values.quantity = quantity.as_str().to_string();
            values.columns_start = Some(quantity.start());
        }

        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quantity_price_amount() {
        let row = "72692-01 coffee maker 127V 100 $12.50 $1,250.00";
        let values = PositionalRowInterpreter.interpret(row);

        assert_eq!(values.quantity, "100");
        assert_eq!(values.unit_price, "$12.50");
        assert_eq!(values.amount, "$1,250.00");
        assert_eq!(&row[..values.columns_start.unwrap()], "72692-01 coffee maker 127V ");
    }

    #[test]
    fn test_unit_word_between_quantity_and_price() {
        let values = PositionalRowInterpreter.interpret("coffee maker 220V 1,200 PCS USD 9.80 USD 11,760.00");
        assert_eq!(values.quantity, "1,200");
        assert_eq!(values.unit_price, "USD 9.80");
        assert_eq!(values.amount, "USD 11,760.00");
    }

    #[test]
    fn test_single_price_has_no_amount() {
        let values = PositionalRowInterpreter.interpret("kettle 50 $7.00");
        assert_eq!(values.quantity, "50");
        assert_eq!(values.unit_price, "$7.00");
        assert_eq!(values.amount, "");
    }

    #[test]
    fn test_middle_prices_are_ignored() {
        let values = PositionalRowInterpreter.interpret("toaster 10 $5.00 $0.50 $55.00");
        assert_eq!(values.unit_price, "$5.00");
        assert_eq!(values.amount, "$55.00");
    }

    #[test]
    fn test_no_bare_number_before_price() {
        let values = PositionalRowInterpreter.interpret("coffee maker 127V $12.50 $25.00");
        assert_eq!(values.quantity, "");
        assert_eq!(values.unit_price, "$12.50");
        assert_eq!(values.columns_start, Some(18));
    }

    #[test]
    fn test_row_without_prices() {
        let values = PositionalRowInterpreter.interpret("Serial NO.: 2024-0001");
        assert!(values.is_empty());
        assert_eq!(values, RowValues::default());
    }
}
