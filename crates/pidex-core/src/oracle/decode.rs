//! Validating decode of oracle output into records.
//!
//! The oracle answers in free text that is supposed to hold JSON. Nothing is
//! trusted: the payload is parsed, its shape checked, and every value
//! coerced into the string-only record schema.

use serde_json::{Map, Value};

use crate::error::OracleError;
use crate::models::record::{ExtractionRecord, RecordField};

/// Separator for list values flattened into one field.
const LIST_SEPARATOR: &str = " | ";

/// Decode oracle content into records.
///
/// Accepts a JSON array of record objects, a single record object, or a
/// wrapper object holding an array of record objects, optionally inside a
/// Markdown code fence. Records without any value are dropped; when none
/// remain the result is [`OracleError::NoRecords`].
pub fn decode_records(content: &str) -> Result<Vec<ExtractionRecord>, OracleError> {
    let payload = strip_code_fence(content);
    if payload.is_empty() {
        return Err(OracleError::EmptyResponse);
    }

    let value: Value =
        serde_json::from_str(payload).map_err(|e| OracleError::Decode(e.to_string()))?;

    let objects = match &value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_object()
                    .ok_or_else(|| OracleError::Decode("array element is not an object".into()))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Value::Object(map) if has_record_keys(map) => vec![map],
        Value::Object(map) => wrapped_records(map)
            .ok_or_else(|| OracleError::Decode("object holds no record fields".into()))?,
        other => {
            return Err(OracleError::Decode(format!(
                "expected an object or array, got {}",
                type_name(other)
            )));
        }
    };

    let mut records = Vec::with_capacity(objects.len());
    for object in objects {
        let record = decode_record(object)?;
        if !record.is_empty() {
            records.push(record);
        }
    }

    if records.is_empty() {
        return Err(OracleError::NoRecords);
    }
    Ok(records)
}

/// Remove a surrounding ```` ```json ```` or ```` ``` ```` fence.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Skip the info string (`json`, `JSON`, ...) up to the first newline.
    let body = match rest.find('\n') {
        Some(newline) if rest[..newline].chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[newline + 1..]
        }
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    body.trim_end().trim_end_matches("```").trim()
}

fn has_record_keys(map: &Map<String, Value>) -> bool {
    map.keys().any(|key| RecordField::from_key(key).is_some())
}

/// The first array of record objects found among the wrapper's values.
fn wrapped_records(map: &Map<String, Value>) -> Option<Vec<&Map<String, Value>>> {
    map.values().find_map(|value| {
        let items = value.as_array()?;
        let objects: Vec<&Map<String, Value>> =
            items.iter().filter_map(Value::as_object).collect();
        let usable = !objects.is_empty()
            && objects.len() == items.len()
            && objects.iter().any(|object| has_record_keys(object));
        usable.then_some(objects)
    })
}

fn decode_record(object: &Map<String, Value>) -> Result<ExtractionRecord, OracleError> {
    let mut record = ExtractionRecord::default();

    for (key, value) in object {
        // Unknown keys are ignored.
        let Some(field) = RecordField::from_key(key) else {
            continue;
        };
        let text = field_text(value)
            .ok_or_else(|| OracleError::Decode(format!("field '{key}' holds a nested object")))?;
        record.set(field, text);
    }

    Ok(record)
}

/// Textual form of a field value, or `None` for structured values.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let parts = items
                .iter()
                .filter(|item| !item.is_null())
                .map(scalar_text)
                .collect::<Option<Vec<_>>>()?;
            Some(parts.join(LIST_SEPARATOR))
        }
        other => scalar_text(other),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json[1]```"), "[1]");
        assert_eq!(strip_code_fence("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_fenced_array_of_records() {
        let content = "```json\n[\n  {\"piNo\": \"PI-1\", \"itemNo\": \"72692-01\"},\n  {\"piNo\": \"PI-1\", \"itemNo\": \"72692-02\"}\n]\n```";
        let records = decode_records(content).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].item_no, "72692-01");
        assert_eq!(records[1].item_no, "72692-02");
        assert_eq!(records[1].pi_no, "PI-1");
    }

    #[test]
    fn test_single_object_is_one_record() {
        let records = decode_records(r#"{"piNo": "PI-7", "swift": "ABCDEFGH"}"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pi_no, "PI-7");
        assert_eq!(records[0].swift, "ABCDEFGH");
        assert_eq!(records[0].account_no, "");
    }

    #[test]
    fn test_wrapper_object() {
        let records = decode_records(r#"{"items": [{"itemNo": "A"}, {"itemNo": "B"}]}"#).unwrap();
        let codes: Vec<&str> = records.iter().map(|r| r.item_no.as_str()).collect();
        assert_eq!(codes, vec!["A", "B"]);
    }

    #[test]
    fn test_value_coercion() {
        let content = r#"{
            "quantity": 100,
            "unitPrice": 12.5,
            "description": ["coffee maker", "127V", null],
            "swift": null,
            "scNo": false,
            "confidence": {"score": 0.9}
        }"#;
        let record = decode_records(content).unwrap().remove(0);

        assert_eq!(record.quantity, "100");
        assert_eq!(record.unit_price, "12.5");
        assert_eq!(record.description, "coffee maker | 127V");
        assert_eq!(record.swift, "");
        assert_eq!(record.sc_no, "false");
    }

    #[test]
    fn test_nested_object_in_field_is_rejected() {
        let result = decode_records(r#"[{"beneficiary": {"name": "X"}}]"#);
        assert!(matches!(result, Err(OracleError::Decode(_))));
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(
            decode_records("Sorry, I cannot help with that."),
            Err(OracleError::Decode(_))
        ));
        assert!(matches!(decode_records("\"text\""), Err(OracleError::Decode(_))));
    }

    #[test]
    fn test_no_records() {
        assert!(matches!(decode_records("[]"), Err(OracleError::NoRecords)));
        assert!(matches!(decode_records("[{}]"), Err(OracleError::NoRecords)));
        assert!(matches!(decode_records("```json\n```"), Err(OracleError::EmptyResponse)));
    }
}
