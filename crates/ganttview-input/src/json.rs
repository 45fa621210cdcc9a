//! JSON and NDJSON record parsing.

use ganttview_core::{FieldValue, Record};
use serde_json::{Map, Value};

use crate::InputError;

/// Parse a JSON document holding records.
///
/// Accepts a top-level array of objects, or an object whose `results`
/// member is such an array (the shape returned by search result endpoints).
pub fn parse_document(input: &str) -> Result<Vec<Record>, InputError> {
    let value: Value = serde_json::from_str(input)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("results") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(InputError::InvalidShape(
                    "'results' must be an array of records".to_string(),
                ))
            }
            None => {
                return Err(InputError::InvalidShape(
                    "expected an array of records or an object with 'results'".to_string(),
                ))
            }
        },
        _ => {
            return Err(InputError::InvalidShape(
                "expected an array of records".to_string(),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(object) => Ok(record_from_object(object)),
            other => Err(InputError::InvalidShape(format!(
                "record {} is {}, expected an object",
                index,
                kind(&other)
            ))),
        })
        .collect()
}

/// Parse newline-delimited JSON, one object per non-blank line
pub fn parse_lines(input: &str) -> Result<Vec<Record>, InputError> {
    let mut records = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line).map_err(|e| InputError::JsonLine {
            line: index + 1,
            message: e.to_string(),
        })?;
        match value {
            Value::Object(object) => records.push(record_from_object(object)),
            other => {
                return Err(InputError::JsonLine {
                    line: index + 1,
                    message: format!("expected an object, found {}", kind(&other)),
                })
            }
        }
    }
    Ok(records)
}

/// Convert a JSON object into a flat record.
///
/// Nested objects are kept as their JSON text so an extras field can be
/// parsed back into structured data later.
pub fn record_from_object(object: Map<String, Value>) -> Record {
    object
        .into_iter()
        .map(|(name, value)| (name, field_value(value)))
        .collect()
}

/// Convert one JSON value into a field value
pub fn field_value(value: Value) -> FieldValue {
    FieldValue::from(value)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
