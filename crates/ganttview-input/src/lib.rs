//! # ganttview-input
//!
//! Loading of event records and chart configuration.
//!
//! This crate provides:
//! - JSON records: a plain array of objects, or a `{"results": [...]}` wrapper
//! - Newline-delimited JSON records (`.ndjson`, `.jsonl`)
//! - CSV records with a header row
//! - Chart configuration from TOML or JSON
//!
//! ## Example
//!
//! ```rust
//! use ganttview_input::{parse_records, RecordFormat};
//!
//! let input = r#"{"results": [{"start": "0", "end": "100", "host": "a"}]}"#;
//! let records = parse_records(input, RecordFormat::Json).unwrap();
//! assert_eq!(records.len(), 1);
//! ```

pub mod config;
pub mod json;
pub mod table;

pub use config::{load_config, parse_config, parse_config_json};

use ganttview_core::Record;
use std::path::Path;
use thiserror::Error;

/// Input loading error
#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON error on line {line}: {message}")]
    JsonLine { line: usize, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid input: {0}")]
    InvalidShape(String),
}

/// Supported record file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// JSON array or `{"results": [...]}` document
    Json,
    /// One JSON object per line
    Ndjson,
    /// Comma separated values with a header row
    Csv,
}

/// Detect record format from extension, defaulting to JSON
pub fn detect_format(path: &Path) -> RecordFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("ndjson" | "jsonl") => RecordFormat::Ndjson,
        Some("csv") => RecordFormat::Csv,
        _ => RecordFormat::Json,
    }
}

/// Parse records from a string in the given format
pub fn parse_records(input: &str, format: RecordFormat) -> Result<Vec<Record>, InputError> {
    let records = match format {
        RecordFormat::Json => json::parse_document(input)?,
        RecordFormat::Ndjson => json::parse_lines(input)?,
        RecordFormat::Csv => table::parse_csv(input)?,
    };
    tracing::debug!(count = records.len(), ?format, "parsed records");
    Ok(records)
}

/// Parse a record file from a path (auto-detects format)
pub fn parse_file(path: &Path) -> Result<Vec<Record>, InputError> {
    let content = std::fs::read_to_string(path)?;
    parse_records(&content, detect_format(path))
}
