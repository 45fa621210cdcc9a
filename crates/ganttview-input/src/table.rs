//! CSV record parsing.

use ganttview_core::{FieldValue, Record};

use crate::InputError;

/// Parse CSV with a header row.
///
/// Every cell is kept as text; numeric interpretation happens during
/// normalization. Empty cells are absent values. Short rows are accepted
/// and their missing trailing cells are left out of the record.
pub fn parse_csv(input: &str) -> Result<Vec<Record>, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(InputError::InvalidShape(
            "CSV input has no header row".to_string(),
        ));
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, cell)| (name.to_string(), FieldValue::from(cell)))
            .collect();
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_header_and_rows() {
        let input = "start, end ,host\n0,100,web-1\n 50 ,80,\n";
        let records = parse_csv(input).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("end"), Some(&FieldValue::from("100")));
        assert_eq!(records[1].get("start"), Some(&FieldValue::from("50")));
        assert!(records[1].get("host").is_none());
    }

    #[test]
    fn short_rows_are_accepted() {
        let records = parse_csv("a,b,c\n1\n").unwrap();
        assert_eq!(records[0].len(), 1);
    }

    #[test]
    fn quoted_cells_keep_commas() {
        let records = parse_csv("start,extras\n0,\"{\"\"a\"\": 1, \"\"b\"\": 2}\"\n").unwrap();
        assert_eq!(
            records[0].get("extras"),
            Some(&FieldValue::from(r#"{"a": 1, "b": 2}"#))
        );
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(parse_csv(""), Err(InputError::InvalidShape(_))));
    }
}
