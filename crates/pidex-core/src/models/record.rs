//! Extraction record models shared by the oracle, the fallback extractor and
//! the record assembler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One invoice line item plus the document-level header fields.
///
/// Every field is a plain string that stays empty when nothing was found, so
/// serialized records always carry all twelve keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractionRecord {
    /// Proforma invoice number (P/I No.).
    pub pi_no: String,

    /// Purchase order number (P/O No.).
    pub po_no: String,

    /// Sales contract number (S/C No.).
    pub sc_no: String,

    /// Item code from the first column of the item table.
    pub item_no: String,

    /// Product name of the item.
    pub description: String,

    /// Quantity, as printed.
    pub quantity: String,

    /// Unit price, as printed (currency marker included).
    pub unit_price: String,

    /// Line amount, as printed (currency marker included).
    pub amount: String,

    /// Payment beneficiary.
    pub beneficiary: String,

    /// Beneficiary's bank.
    pub name_of_bank: String,

    /// Beneficiary's account number.
    pub account_no: String,

    /// Bank SWIFT/BIC code.
    pub swift: String,
}

/// The twelve fields of an [`ExtractionRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    PiNo,
    PoNo,
    ScNo,
    ItemNo,
    Description,
    Quantity,
    UnitPrice,
    Amount,
    Beneficiary,
    NameOfBank,
    AccountNo,
    Swift,
}

impl RecordField {
    /// All fields in schema order.
    pub const ALL: [RecordField; 12] = [
        RecordField::PiNo,
        RecordField::PoNo,
        RecordField::ScNo,
        RecordField::ItemNo,
        RecordField::Description,
        RecordField::Quantity,
        RecordField::UnitPrice,
        RecordField::Amount,
        RecordField::Beneficiary,
        RecordField::NameOfBank,
        RecordField::AccountNo,
        RecordField::Swift,
    ];

    /// Header fields, shared by every item of a document.
    pub const HEADER: [RecordField; 7] = [
        RecordField::PiNo,
        RecordField::PoNo,
        RecordField::ScNo,
        RecordField::Beneficiary,
        RecordField::NameOfBank,
        RecordField::AccountNo,
        RecordField::Swift,
    ];

    /// JSON key of the field.
    pub fn key(&self) -> &'static str {
        match self {
            RecordField::PiNo => "piNo",
            RecordField::PoNo => "poNo",
            RecordField::ScNo => "scNo",
            RecordField::ItemNo => "itemNo",
            RecordField::Description => "description",
            RecordField::Quantity => "quantity",
            RecordField::UnitPrice => "unitPrice",
            RecordField::Amount => "amount",
            RecordField::Beneficiary => "beneficiary",
            RecordField::NameOfBank => "nameOfBank",
            RecordField::AccountNo => "accountNo",
            RecordField::Swift => "swift",
        }
    }

    /// Column label as printed on proforma invoices.
    pub fn label(&self) -> &'static str {
        match self {
            RecordField::PiNo => "P/I No.",
            RecordField::PoNo => "P/O No.",
            RecordField::ScNo => "S/C No.",
            RecordField::ItemNo => "Item No.",
            RecordField::Description => "Description",
            RecordField::Quantity => "Quantity",
            RecordField::UnitPrice => "Unit Price",
            RecordField::Amount => "Amount",
            RecordField::Beneficiary => "BENEFICIARY",
            RecordField::NameOfBank => "NAME OF THE BANK",
            RecordField::AccountNo => "ACCOUNT No.",
            RecordField::Swift => "SWIFT",
        }
    }

    /// Look up a field by its JSON key (case-insensitive, `_` ignored).
    pub fn from_key(key: &str) -> Option<Self> {
        let normalized: String = key
            .chars()
            .filter(|c| *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        RecordField::ALL
            .into_iter()
            .find(|f| f.key().to_lowercase() == normalized)
    }
}

impl ExtractionRecord {
    /// Read a field by name.
    pub fn get(&self, field: RecordField) -> &str {
        match field {
            RecordField::PiNo => &self.pi_no,
            RecordField::PoNo => &self.po_no,
            RecordField::ScNo => &self.sc_no,
            RecordField::ItemNo => &self.item_no,
            RecordField::Description => &self.description,
            RecordField::Quantity => &self.quantity,
            RecordField::UnitPrice => &self.unit_price,
            RecordField::Amount => &self.amount,
            RecordField::Beneficiary => &self.beneficiary,
            RecordField::NameOfBank => &self.name_of_bank,
            RecordField::AccountNo => &self.account_no,
            RecordField::Swift => &self.swift,
        }
    }

    /// Mutable access to a field by name.
    pub fn get_mut(&mut self, field: RecordField) -> &mut String {
        match field {
            RecordField::PiNo => &mut self.pi_no,
            RecordField::PoNo => &mut self.po_no,
            RecordField::ScNo => &mut self.sc_no,
            RecordField::ItemNo => &mut self.item_no,
            RecordField::Description => &mut self.description,
            RecordField::Quantity => &mut self.quantity,
            RecordField::UnitPrice => &mut self.unit_price,
            RecordField::Amount => &mut self.amount,
            RecordField::Beneficiary => &mut self.beneficiary,
            RecordField::NameOfBank => &mut self.name_of_bank,
            RecordField::AccountNo => &mut self.account_no,
            RecordField::Swift => &mut self.swift,
        }
    }

    /// Set a field by name.
    pub fn set(&mut self, field: RecordField, value: impl Into<String>) {
        *self.get_mut(field) = value.into();
    }

    /// Copy the header fields of `header` onto this record.
    pub fn with_header(mut self, header: &ExtractionRecord) -> Self {
        for field in RecordField::HEADER {
            self.set(field, header.get(field));
        }
        self
    }

    /// Check if no field carries a value.
    pub fn is_empty(&self) -> bool {
        RecordField::ALL.iter().all(|f| self.get(*f).is_empty())
    }
}

/// A record ready for display or export: one extracted item of one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    /// Process-unique identifier.
    pub id: String,

    /// Name of the source file.
    pub file_name: String,

    /// Extracted fields.
    #[serde(flatten)]
    pub record: ExtractionRecord,

    /// When the record was assembled.
    pub extracted_at: DateTime<Utc>,
}
