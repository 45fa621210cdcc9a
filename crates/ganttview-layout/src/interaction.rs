//! Tooltip payloads and click drilldown requests.

use ganttview_core::{ChartConfig, Color, DrilldownRequest, Extras, Task, Tooltip, TooltipRow};
use serde_json::Value;

use crate::normalize::EVENT_TIME_FIELD;
use crate::time::{date_str, duration_str};

fn pair(label: &str, value: impl Into<String>, color: Option<Color>) -> TooltipRow {
    TooltipRow::Pair {
        label: label.to_string(),
        value: value.into(),
        color,
    }
}

/// Tooltip rows of one task.
///
/// Start, end, duration, series (tinted) and category come first, then
/// the extras: object members as rows, a plain string as one full row.
pub fn tooltip_for(task: &Task, config: &ChartConfig, series_color: Color) -> Tooltip {
    let mut rows = vec![
        pair("Start time", date_str(&task.start), None),
        pair("End time", date_str(&task.end), None),
        pair("Duration", duration_str(task.duration), None),
        pair(&config.series_label, task.series.clone(), Some(series_color)),
        pair(&config.category_label, task.category.clone(), None),
    ];

    match &task.extras {
        Extras::Structured(Value::Object(members)) => {
            for (key, value) in members {
                rows.push(pair(key, display_value(value), None));
            }
        }
        Extras::Structured(Value::Array(items)) => {
            for (index, value) in items.iter().enumerate() {
                rows.push(pair(&index.to_string(), display_value(value), None));
            }
        }
        Extras::Structured(Value::String(text)) | Extras::Text(text) => {
            rows.push(TooltipRow::Note { text: text.clone() });
        }
        Extras::Structured(_) | Extras::None => {}
    }

    Tooltip { rows }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Drilldown request for a clicked task.
///
/// With a drilldown field configured the request narrows on its value;
/// otherwise on a window one second wider than the task on each side,
/// anchored at the event time (or the task start when there is none).
pub fn drilldown_for(task: &Task, config: &ChartConfig) -> DrilldownRequest {
    if let Some(name) = config.drilldown() {
        return DrilldownRequest::Field {
            name: name.to_string(),
            value: task
                .id
                .field
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
        };
    }

    let time = task
        .id
        .time
        .unwrap_or_else(|| task.start.timestamp_millis() as f64 / 1000.0);
    DrilldownRequest::TimeRange {
        name: EVENT_TIME_FIELD.to_string(),
        earliest: time.trunc() as i64 - 1,
        span: task.id.span.trunc() as i64 + 2,
    }
}
