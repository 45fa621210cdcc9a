//! # ganttview-core
//!
//! Core domain model and traits for the ganttview chart engine.
//!
//! This crate provides:
//! - Input types: `Record`, `FieldValue`, `ChartConfig`
//! - Domain types: `Task`, `TaskId`, `Extras`
//! - Output primitives: `Layout`, `Bar`, axes, legend, tooltips, drilldown requests
//! - Core traits: `Renderer`, `TextMeasure`, `DiagnosticEmitter`
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use ganttview_core::{ChartConfig, Record};
//!
//! let config = ChartConfig::new()
//!     .start_field("start")
//!     .end_field("end")
//!     .category_field("host");
//! assert!(config.validate().is_ok());
//!
//! let record = Record::new()
//!     .with("start", 0)
//!     .with("end", 100)
//!     .with("host", "web-1");
//! assert_eq!(record.get("host").and_then(|v| v.as_text()).as_deref(), Some("web-1"));
//! ```

pub mod diagnostics;
pub mod layout;
pub mod measure;

pub use diagnostics::{
    CollectingEmitter, Diagnostic, DiagnosticCode, DiagnosticEmitter, NullEmitter, Severity,
};
pub use layout::{
    AxisTitle, Bar, BarData, CategoryAxis, CategoryTick, Color, DrilldownRequest, Layout, Legend,
    LegendEntry, Margin, TimeAxis, TimeTick, Tooltip, TooltipRow, Viewport,
};
pub use measure::{ApproxTextMeasure, TextExtent, TextMeasure};

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use thiserror::Error;

// ============================================================================
// Records
// ============================================================================

/// A single raw value of an input record
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Multi-valued field
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Missing, null and blank text values carry no information
    pub fn is_absent(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.iter().all(FieldValue::is_absent),
            _ => false,
        }
    }

    /// Numeric interpretation: numbers, and text that parses fully as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    trimmed.parse::<f64>().ok()
                }
            }
            _ => None,
        }
    }

    /// Text interpretation used for labels, categories and date strings
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            FieldValue::Bool(b) => Some(Cow::Owned(b.to_string())),
            FieldValue::Number(n) => Some(Cow::Owned(format_number(*n))),
            FieldValue::List(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .filter_map(|v| v.as_text().map(Cow::into_owned))
                    .collect();
                Some(Cow::Owned(parts.join(",")))
            }
        }
    }
}

/// Nested objects are kept as their JSON text so an extras field can be
/// parsed back into structured data later.
impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => n.as_f64().map_or(FieldValue::Null, FieldValue::Number),
            Value::String(s) => FieldValue::Text(s),
            Value::Array(items) => {
                FieldValue::List(items.into_iter().map(FieldValue::from).collect())
            }
            object @ Value::Object(_) => FieldValue::Text(object.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(FieldValue::from)
    }
}

/// Format a number without a trailing `.0` for integral values
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// A flat input record: field name to value
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Look up a field, treating absent values as missing
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name).filter(|v| !v.is_absent())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Chart Configuration
// ============================================================================

/// Default label of the category axis; a custom label adds an axis title
pub const DEFAULT_CATEGORY_LABEL: &str = "Category";

/// Default label of the series row in tooltips
pub const DEFAULT_SERIES_LABEL: &str = "Series";

/// Horizontal overlap rule used by the row packer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapRule {
    /// `[start, end)` intervals: bars that only touch share a row
    #[default]
    HalfOpen,
    /// Closed intervals: touching bars are pushed to separate rows
    Inclusive,
}

impl OverlapRule {
    /// Whether two horizontal extents collide under this rule
    pub fn overlaps(self, a: (f64, f64), b: (f64, f64)) -> bool {
        match self {
            OverlapRule::HalfOpen => a.0 < b.1 && b.0 < a.1,
            OverlapRule::Inclusive => a.0 <= b.1 && b.0 <= a.1,
        }
    }
}

/// Bar geometry preset
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BarMetrics {
    /// Bar height in pixels
    pub height: f64,
    /// Vertical spacing between rows in pixels
    pub spacing: f64,
    /// Corner radius in pixels
    pub corner_radius: f64,
}

impl BarMetrics {
    pub const fn regular() -> Self {
        Self {
            height: 20.0,
            spacing: 4.0,
            corner_radius: 3.0,
        }
    }

    pub const fn compact() -> Self {
        Self {
            height: 5.0,
            spacing: 1.0,
            corner_radius: 0.0,
        }
    }

    /// Row pitch inside a category
    pub fn gap(&self) -> f64 {
        self.height + self.spacing
    }
}

impl Default for BarMetrics {
    fn default() -> Self {
        Self::regular()
    }
}

/// Which pair of time fields drives interval resolution
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimeMode {
    /// Duration is derived from start and end
    StartEnd { start: String, end: String },
    /// End is derived from start plus duration
    StartDuration { start: String, duration: String },
    /// Start is derived from end minus duration
    EndDuration { end: String, duration: String },
}

/// Chart configuration as supplied by the dashboard
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ChartConfig {
    pub start_field: Option<String>,
    pub end_field: Option<String>,
    pub duration_field: Option<String>,
    pub category_field: Option<String>,
    pub series_field: Option<String>,
    pub extras_field: Option<String>,
    pub drilldown_field: Option<String>,
    pub category_label: String,
    pub series_label: String,
    #[serde(deserialize_with = "flexible_bool")]
    pub show_legend: bool,
    #[serde(deserialize_with = "flexible_bool")]
    pub compact: bool,
    pub packing: OverlapRule,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            start_field: None,
            end_field: None,
            duration_field: None,
            category_field: None,
            series_field: None,
            extras_field: None,
            drilldown_field: None,
            category_label: DEFAULT_CATEGORY_LABEL.to_string(),
            series_label: DEFAULT_SERIES_LABEL.to_string(),
            show_legend: true,
            compact: false,
            packing: OverlapRule::HalfOpen,
        }
    }
}

impl ChartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_field(mut self, name: impl Into<String>) -> Self {
        self.start_field = Some(name.into());
        self
    }

    pub fn end_field(mut self, name: impl Into<String>) -> Self {
        self.end_field = Some(name.into());
        self
    }

    pub fn duration_field(mut self, name: impl Into<String>) -> Self {
        self.duration_field = Some(name.into());
        self
    }

    pub fn category_field(mut self, name: impl Into<String>) -> Self {
        self.category_field = Some(name.into());
        self
    }

    pub fn series_field(mut self, name: impl Into<String>) -> Self {
        self.series_field = Some(name.into());
        self
    }

    pub fn extras_field(mut self, name: impl Into<String>) -> Self {
        self.extras_field = Some(name.into());
        self
    }

    pub fn drilldown_field(mut self, name: impl Into<String>) -> Self {
        self.drilldown_field = Some(name.into());
        self
    }

    pub fn category_label(mut self, label: impl Into<String>) -> Self {
        self.category_label = label.into();
        self
    }

    pub fn series_label(mut self, label: impl Into<String>) -> Self {
        self.series_label = label.into();
        self
    }

    pub fn show_legend(mut self, show: bool) -> Self {
        self.show_legend = show;
        self
    }

    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn packing(mut self, rule: OverlapRule) -> Self {
        self.packing = rule;
        self
    }

    /// A configured field name, ignoring blanks
    fn field(name: &Option<String>) -> Option<&str> {
        name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    pub fn start(&self) -> Option<&str> {
        Self::field(&self.start_field)
    }

    pub fn end(&self) -> Option<&str> {
        Self::field(&self.end_field)
    }

    pub fn duration(&self) -> Option<&str> {
        Self::field(&self.duration_field)
    }

    pub fn category(&self) -> Option<&str> {
        Self::field(&self.category_field)
    }

    pub fn series(&self) -> Option<&str> {
        Self::field(&self.series_field)
    }

    pub fn extras(&self) -> Option<&str> {
        Self::field(&self.extras_field)
    }

    pub fn drilldown(&self) -> Option<&str> {
        Self::field(&self.drilldown_field)
    }

    /// Number of configured time fields (start, end, duration)
    pub fn time_field_count(&self) -> usize {
        [self.start(), self.end(), self.duration()]
            .iter()
            .filter(|f| f.is_some())
            .count()
    }

    /// Resolve which time fields drive the interval computation.
    ///
    /// Start and end win over duration when all three are configured.
    pub fn time_mode(&self) -> Result<TimeMode, ConfigError> {
        match (self.start(), self.end(), self.duration()) {
            (Some(start), Some(end), _) => Ok(TimeMode::StartEnd {
                start: start.to_string(),
                end: end.to_string(),
            }),
            (Some(start), None, Some(duration)) => Ok(TimeMode::StartDuration {
                start: start.to_string(),
                duration: duration.to_string(),
            }),
            (None, Some(end), Some(duration)) => Ok(TimeMode::EndDuration {
                end: end.to_string(),
                duration: duration.to_string(),
            }),
            _ => Err(ConfigError::InsufficientTimeFields {
                configured: self.time_field_count(),
            }),
        }
    }

    /// Check the configuration is renderable
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.time_mode().map(|_| ())
    }

    /// Bar geometry for the current `compact` setting
    pub fn bar_metrics(&self) -> BarMetrics {
        if self.compact {
            BarMetrics::compact()
        } else {
            BarMetrics::regular()
        }
    }

    /// Whether the category axis carries a title
    pub fn has_category_title(&self) -> bool {
        self.category_label != DEFAULT_CATEGORY_LABEL
    }
}

/// Accept `true`/`false` as booleans or as the strings used by dashboard settings
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlexibleBool;

    impl<'de> de::Visitor<'de> for FlexibleBool {
        type Value = bool;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a boolean or one of the strings \"true\", \"false\"")
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
            Ok(value)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
            match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" | "" => Ok(false),
                _ => Err(E::invalid_value(de::Unexpected::Str(value), &self)),
            }
        }
    }

    deserializer.deserialize_any(FlexibleBool)
}

// ============================================================================
// Task
// ============================================================================

/// Opaque identity of a task, carried into drilldown requests
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskId {
    /// Event time of the source record in epoch seconds (`_time`)
    pub time: Option<f64>,
    /// Task span in seconds
    pub span: f64,
    /// Value of the configured drilldown field
    pub field: Option<String>,
}

/// Auxiliary payload shown in tooltips
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Extras {
    #[default]
    None,
    /// Parsed JSON value
    Structured(serde_json::Value),
    /// Raw text kept when JSON parsing fails
    Text(String),
}

/// A normalized time interval
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Seconds, never negative
    pub duration: f64,
    pub category: String,
    pub series: String,
    pub extras: Extras,
}

impl Task {
    /// Create a task from explicit instants; duration is derived
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let duration = (end - start).num_milliseconds() as f64 / 1000.0;
        Self {
            id: TaskId {
                time: None,
                span: duration,
                field: None,
            },
            start,
            end,
            duration,
            category: String::new(),
            series: String::new(),
            extras: Extras::None,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn series(mut self, series: impl Into<String>) -> Self {
        self.series = series.into();
        self
    }

    pub fn extras(mut self, extras: Extras) -> Self {
        self.extras = extras;
        self
    }

    pub fn start_millis(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_millis(&self) -> i64 {
        self.end.timestamp_millis()
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render a computed layout to the output format
    fn render(&self, layout: &Layout) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Chart configuration error; the chart is not rendered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Must specify at least two of: startField, endField, durationField.")]
    InsufficientTimeFields { configured: usize },
}

/// Why a single record could not become a task
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("missing value for field '{field}'")]
    MissingValue { field: String },

    #[error("cannot interpret '{value}' in field '{field}' as a date/time")]
    UnparseableTime { field: String, value: String },

    #[error("duration '{value}' in field '{field}' is not a finite number")]
    NonFiniteDuration { field: String, value: String },

    #[error("end time precedes start time by {seconds} seconds")]
    NegativeDuration { seconds: f64 },

    #[error("resolved time is outside the representable range")]
    OutOfRange,
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
