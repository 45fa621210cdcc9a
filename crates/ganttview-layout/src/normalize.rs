//! Interval normalization: raw records to tasks.
//!
//! Each record is resolved independently. A record that cannot be turned
//! into a valid `[start, end]` interval is dropped and reported; it never
//! stops the records after it.

use chrono::{DateTime, TimeDelta, Utc};
use ganttview_core::{
    ChartConfig, ConfigError, Diagnostic, DiagnosticCode, DiagnosticEmitter, Extras, FieldValue,
    NormalizeError, Record, Task, TaskId, TimeMode,
};

use crate::time::parse_instant;

/// Field holding the event time used for time-range drilldown
pub const EVENT_TIME_FIELD: &str = "_time";

/// Largest accepted duration in seconds (about 3000 years)
const MAX_DURATION_SECONDS: f64 = 1e11;

/// Record-to-task converter bound to one chart configuration
#[derive(Debug, Clone)]
pub struct Normalizer<'a> {
    config: &'a ChartConfig,
    mode: TimeMode,
}

impl<'a> Normalizer<'a> {
    /// Fails when fewer than two time fields are configured
    pub fn new(config: &'a ChartConfig) -> Result<Self, ConfigError> {
        let mode = config.time_mode()?;
        Ok(Self { config, mode })
    }

    pub fn mode(&self) -> &TimeMode {
        &self.mode
    }

    /// Resolve one record into a task
    pub fn normalize_record(&self, record: &Record) -> Result<Task, NormalizeError> {
        let (start, end, duration) = match &self.mode {
            TimeMode::StartEnd { start, end } => {
                let start_at = instant(record, start)?;
                let end_at = instant(record, end)?;
                let duration = (end_at - start_at).num_milliseconds() as f64 / 1000.0;
                (start_at, end_at, duration)
            }
            TimeMode::StartDuration { start, duration } => {
                let start_at = instant(record, start)?;
                let seconds = seconds(record, duration)?;
                let end_at = shift(start_at, seconds)?;
                (start_at, end_at, seconds)
            }
            TimeMode::EndDuration { end, duration } => {
                let end_at = instant(record, end)?;
                let seconds = seconds(record, duration)?;
                let start_at = shift(end_at, -seconds)?;
                (start_at, end_at, seconds)
            }
        };

        if duration < 0.0 || end < start {
            return Err(NormalizeError::NegativeDuration { seconds: -duration });
        }

        let id = TaskId {
            time: record
                .get(EVENT_TIME_FIELD)
                .and_then(|v| parse_instant(EVENT_TIME_FIELD, v).ok())
                .map(|t| t.timestamp_millis() as f64 / 1000.0),
            span: duration,
            field: self
                .config
                .drilldown()
                .and_then(|name| text(record, name)),
        };

        Ok(Task {
            id,
            start,
            end,
            duration,
            category: self
                .config
                .category()
                .and_then(|name| text(record, name))
                .unwrap_or_default(),
            series: self
                .config
                .series()
                .and_then(|name| text(record, name))
                .unwrap_or_default(),
            extras: self
                .config
                .extras()
                .and_then(|name| record.get(name))
                .map(parse_extras)
                .unwrap_or_default(),
        })
    }

    /// Resolve all records, dropping and reporting the unresolvable ones
    pub fn normalize_all(
        &self,
        records: &[Record],
        emitter: &mut dyn DiagnosticEmitter,
    ) -> Vec<Task> {
        let mut tasks = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            match self.normalize_record(record) {
                Ok(task) => {
                    if let Extras::Text(raw) = &task.extras {
                        emitter.emit(
                            Diagnostic::new(
                                DiagnosticCode::I001ExtrasAsText,
                                format!("extras of record {} are not JSON, kept as text", index),
                            )
                            .with_record(index)
                            .with_note(format!("value: {}", raw)),
                        );
                    }
                    tasks.push(task);
                }
                Err(err) => {
                    tracing::warn!(record = index, reason = %err, "unable to format event");
                    emitter.emit(
                        Diagnostic::new(
                            DiagnosticCode::W001UnresolvableRecord,
                            format!("record {} dropped: {}", index, err),
                        )
                        .with_record(index),
                    );
                }
            }
        }

        if tasks.is_empty() {
            emitter.emit(
                Diagnostic::new(DiagnosticCode::W002EmptyDataset, "no events to display")
                    .with_note(format!("{} record(s) in input", records.len())),
            );
        }
        tracing::debug!(
            records = records.len(),
            tasks = tasks.len(),
            "normalized records"
        );
        tasks
    }
}

/// Normalize records under a configuration.
///
/// A configuration error is reported as `E001` and yields no tasks.
pub fn normalize(
    config: &ChartConfig,
    records: &[Record],
    emitter: &mut dyn DiagnosticEmitter,
) -> Result<Vec<Task>, ConfigError> {
    match Normalizer::new(config) {
        Ok(normalizer) => Ok(normalizer.normalize_all(records, emitter)),
        Err(err) => {
            emitter.emit(
                Diagnostic::new(DiagnosticCode::E001InsufficientTimeFields, err.to_string())
                    .with_note(format!(
                        "{} time field(s) configured",
                        config.time_field_count()
                    ))
                    .with_note("set two of startField, endField and durationField"),
            );
            Err(err)
        }
    }
}

fn present<'r>(record: &'r Record, field: &str) -> Result<&'r FieldValue, NormalizeError> {
    record.get(field).ok_or_else(|| NormalizeError::MissingValue {
        field: field.to_string(),
    })
}

fn instant(record: &Record, field: &str) -> Result<DateTime<Utc>, NormalizeError> {
    parse_instant(field, present(record, field)?)
}

fn seconds(record: &Record, field: &str) -> Result<f64, NormalizeError> {
    let value = present(record, field)?;
    match value.as_number() {
        Some(n) if n.is_finite() => {
            if n.abs() > MAX_DURATION_SECONDS {
                Err(NormalizeError::OutOfRange)
            } else {
                Ok(n)
            }
        }
        _ => Err(NormalizeError::NonFiniteDuration {
            field: field.to_string(),
            value: value.as_text().map(|t| t.into_owned()).unwrap_or_default(),
        }),
    }
}

fn shift(at: DateTime<Utc>, seconds: f64) -> Result<DateTime<Utc>, NormalizeError> {
    let millis = (seconds * 1000.0).trunc() as i64;
    TimeDelta::try_milliseconds(millis)
        .and_then(|delta| at.checked_add_signed(delta))
        .ok_or(NormalizeError::OutOfRange)
}

fn text(record: &Record, field: &str) -> Option<String> {
    record
        .get(field)
        .and_then(|v| v.as_text())
        .map(|t| t.into_owned())
}

/// JSON first, raw text when that fails
fn parse_extras(value: &FieldValue) -> Extras {
    match value {
        FieldValue::Text(raw) => match serde_json::from_str(raw) {
            Ok(parsed) => Extras::Structured(parsed),
            Err(_) => Extras::Text(raw.clone()),
        },
        other => match serde_json::to_value(other) {
            Ok(parsed) => Extras::Structured(parsed),
            Err(_) => Extras::Text(other.as_text().map(|t| t.into_owned()).unwrap_or_default()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ganttview_core::CollectingEmitter;
    use pretty_assertions::assert_eq;

    fn start_end() -> ChartConfig {
        ChartConfig::new()
            .start_field("start")
            .end_field("end")
            .category_field("cat")
            .series_field("series")
    }

    #[test]
    fn start_and_end_give_duration() {
        let config = start_end();
        let normalizer = Normalizer::new(&config).unwrap();
        let task = normalizer
            .normalize_record(
                &Record::new()
                    .with("start", 0)
                    .with("end", 100)
                    .with("cat", "A")
                    .with("series", "x"),
            )
            .unwrap();
        assert_eq!(task.duration, 100.0);
        assert_eq!(task.start.timestamp(), 0);
        assert_eq!(task.end.timestamp(), 100);
        assert_eq!(task.category, "A");
        assert_eq!(task.series, "x");
        assert_eq!(task.id.span, 100.0);
    }

    #[test]
    fn start_plus_duration() {
        let config = ChartConfig::new()
            .start_field("start")
            .duration_field("dur");
        let normalizer = Normalizer::new(&config).unwrap();
        let task = normalizer
            .normalize_record(
                &Record::new()
                    .with("start", "2025-01-01T00:00:00Z")
                    .with("dur", "90"),
            )
            .unwrap();
        assert_eq!(
            task.end,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 1, 30).unwrap()
        );
        assert_eq!(task.duration, 90.0);
        assert_eq!(task.category, "");
    }

    #[test]
    fn end_minus_duration() {
        let config = ChartConfig::new().end_field("end").duration_field("dur");
        let normalizer = Normalizer::new(&config).unwrap();
        let task = normalizer
            .normalize_record(&Record::new().with("end", 1000).with("dur", 250.5))
            .unwrap();
        assert_eq!(task.start.timestamp_millis(), 749_500);
        assert_eq!(task.duration, 250.5);
    }

    #[test]
    fn end_with_unusable_duration_is_dropped() {
        let config = ChartConfig::new().end_field("end").duration_field("dur");
        let normalizer = Normalizer::new(&config).unwrap();

        for dur in [
            FieldValue::Number(f64::NAN),
            FieldValue::Number(f64::INFINITY),
            FieldValue::from("abc"),
            FieldValue::Bool(true),
        ] {
            let record = Record::new().with("end", 1000).with("dur", dur.clone());
            assert!(
                matches!(
                    normalizer.normalize_record(&record),
                    Err(NormalizeError::NonFiniteDuration { .. })
                ),
                "duration {:?} should be rejected",
                dur
            );
        }

        let records = vec![
            Record::new().with("end", 1000).with("dur", f64::NAN),
            Record::new().with("end", 1000).with("dur", "later"),
            Record::new().with("end", 1000).with("dur", 10),
        ];
        let mut emitter = CollectingEmitter::new();
        let tasks = normalize(&config, &records, &mut emitter).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].start.timestamp(), 990);
        let dropped: Vec<Option<usize>> = emitter.diagnostics.iter().map(|d| d.record).collect();
        assert_eq!(dropped, vec![Some(0), Some(1)]);
    }

    #[test]
    fn fractional_milliseconds_keep_start_before_end() {
        let config = ChartConfig::new().start_field("start").end_field("end");
        let normalizer = Normalizer::new(&config).unwrap();

        let pairs = [
            (0.0004, 0.0006),
            (10.0001, 10.0009),
            (1_700_000_000.1234, 1_700_000_000.1236),
            (5.0, 5.0005),
            (5.0007, 5.0004),
            (99.9999, 100.0001),
            (-0.0004, 0.0004),
        ];
        for (start, end) in pairs {
            let record = Record::new().with("start", start).with("end", end);
            match normalizer.normalize_record(&record) {
                Ok(task) => {
                    assert!(task.start <= task.end, "{} .. {}", start, end);
                    let millis = task.end_millis() - task.start_millis();
                    assert!((task.duration - millis as f64 / 1000.0).abs() < 1e-9);
                    assert!(task.duration >= 0.0);
                }
                Err(err) => {
                    assert!(end < start, "{} .. {} rejected: {}", start, end, err);
                    assert!(matches!(err, NormalizeError::NegativeDuration { .. }));
                }
            }
        }
    }

    #[test]
    fn duration_field_ignored_when_start_and_end_set() {
        let config = start_end().duration_field("dur");
        let normalizer = Normalizer::new(&config).unwrap();
        let task = normalizer
            .normalize_record(
                &Record::new()
                    .with("start", 10)
                    .with("end", 20)
                    .with("dur", "garbage"),
            )
            .unwrap();
        assert_eq!(task.duration, 10.0);
    }

    #[test]
    fn unresolvable_records() {
        let config = ChartConfig::new()
            .start_field("start")
            .duration_field("dur");
        let normalizer = Normalizer::new(&config).unwrap();

        let err = normalizer
            .normalize_record(&Record::new().with("start", 0).with("dur", "NaN"))
            .unwrap_err();
        assert!(matches!(err, NormalizeError::NonFiniteDuration { .. }));

        let err = normalizer
            .normalize_record(&Record::new().with("start", 0))
            .unwrap_err();
        assert_eq!(
            err,
            NormalizeError::MissingValue {
                field: "dur".into()
            }
        );

        let err = normalizer
            .normalize_record(&Record::new().with("start", 0).with("dur", -5))
            .unwrap_err();
        assert!(matches!(err, NormalizeError::NegativeDuration { .. }));
    }

    #[test]
    fn end_before_start_is_dropped() {
        let config = start_end();
        let normalizer = Normalizer::new(&config).unwrap();
        let err = normalizer
            .normalize_record(&Record::new().with("start", 100).with("end", 50))
            .unwrap_err();
        assert_eq!(err, NormalizeError::NegativeDuration { seconds: 50.0 });
    }

    #[test]
    fn extras_json_then_text() {
        let config = start_end().extras_field("extras");
        let normalizer = Normalizer::new(&config).unwrap();
        let base = Record::new().with("start", 0).with("end", 1);

        let task = normalizer
            .normalize_record(&base.clone().with("extras", r#"{"pid": 7}"#))
            .unwrap();
        assert_eq!(
            task.extras,
            Extras::Structured(serde_json::json!({"pid": 7}))
        );

        let task = normalizer
            .normalize_record(&base.clone().with("extras", "not json"))
            .unwrap();
        assert_eq!(task.extras, Extras::Text("not json".into()));

        let task = normalizer.normalize_record(&base).unwrap();
        assert_eq!(task.extras, Extras::None);
    }

    #[test]
    fn task_identity() {
        let config = start_end().drilldown_field("host");
        let normalizer = Normalizer::new(&config).unwrap();
        let task = normalizer
            .normalize_record(
                &Record::new()
                    .with("start", 0)
                    .with("end", 30)
                    .with("_time", "1970-01-01T00:01:40Z")
                    .with("host", "web-1"),
            )
            .unwrap();
        assert_eq!(
            task.id,
            TaskId {
                time: Some(100.0),
                span: 30.0,
                field: Some("web-1".into())
            }
        );
    }

    #[test]
    fn bad_records_do_not_stop_later_ones() {
        let config = ChartConfig::new()
            .start_field("start")
            .duration_field("dur")
            .extras_field("extras");
        let records = vec![
            Record::new().with("start", 0).with("dur", 10),
            Record::new().with("start", 0).with("dur", f64::NAN),
            Record::new()
                .with("start", 5)
                .with("dur", 10)
                .with("extras", "plain"),
        ];
        let mut emitter = CollectingEmitter::new();
        let tasks = normalize(&config, &records, &mut emitter).unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].start.timestamp(), 5);
        assert_eq!(emitter.count(DiagnosticCode::W001UnresolvableRecord), 1);
        assert_eq!(emitter.count(DiagnosticCode::I001ExtrasAsText), 1);
        assert_eq!(emitter.diagnostics[0].record, Some(1));
    }

    #[test]
    fn insufficient_fields_is_a_config_error() {
        let config = ChartConfig::new().start_field("start");
        let records = vec![Record::new().with("start", 0)];
        let mut emitter = CollectingEmitter::new();
        let result = normalize(&config, &records, &mut emitter);

        assert_eq!(
            result,
            Err(ConfigError::InsufficientTimeFields { configured: 1 })
        );
        assert!(emitter.has_errors());
        assert_eq!(emitter.count(DiagnosticCode::E001InsufficientTimeFields), 1);
    }

    #[test]
    fn empty_result_is_reported() {
        let config = start_end();
        let mut emitter = CollectingEmitter::new();
        let tasks = normalize(&config, &[], &mut emitter).unwrap();
        assert!(tasks.is_empty());
        assert_eq!(emitter.count(DiagnosticCode::W002EmptyDataset), 1);
    }
}
