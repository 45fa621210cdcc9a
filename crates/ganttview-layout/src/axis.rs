//! Axis and legend geometry.

use ganttview_core::{
    AxisTitle, CategoryAxis, CategoryTick, Color, Legend, LegendEntry, TextMeasure, TimeAxis,
    TimeTick,
};

use crate::scale::{format_tick, tick_count, TimeScale};

pub const TICK_FONT_SIZE: f64 = 11.0;
pub const TITLE_FONT_SIZE: f64 = 12.0;
pub const LEGEND_FONT_SIZE: f64 = 12.0;

/// Length of axis tick marks
pub const TICK_SIZE: f64 = 6.0;
/// Gap between a tick mark and its label
pub const TICK_PADDING: f64 = 3.0;
/// Gap between category labels and the rotated axis title
const TITLE_GAP: f64 = 10.0;
/// Gap between time labels and the axis title
const TIME_TITLE_GAP: f64 = 5.0;

pub const TIME_AXIS_TITLE: &str = "Time";

/// Padding around each legend label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPadding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
    /// Horizontal space between swatches
    pub spacing: f64,
}

impl Default for KeyPadding {
    fn default() -> Self {
        Self {
            top: 2.0,
            right: 10.0,
            bottom: 2.0,
            left: 10.0,
            spacing: 10.0,
        }
    }
}

/// Width of the category axis: widest label, tick, padding and optional title
pub fn category_axis_width(
    categories: &[String],
    title: Option<&str>,
    measure: &dyn TextMeasure,
) -> f64 {
    let widest = categories
        .iter()
        .map(|c| measure.measure(c, TICK_FONT_SIZE).width)
        .fold(0.0, f64::max);
    let mut width = widest + TICK_SIZE + TICK_PADDING;
    if let Some(title) = title {
        width += measure.measure(title, TITLE_FONT_SIZE).height + TITLE_GAP;
    }
    width
}

/// Build the category axis.
///
/// `offsets` holds the top of each category band followed by the end of the
/// last band, relative to `top`. The axis line sits at `left` plus the axis width.
pub fn category_axis(
    categories: &[String],
    offsets: &[f64],
    gap: f64,
    title: Option<&str>,
    left: f64,
    top: f64,
    measure: &dyn TextMeasure,
) -> CategoryAxis {
    let width = category_axis_width(categories, title, measure);
    let height = offsets.last().copied().unwrap_or(0.0);

    let ticks = categories
        .iter()
        .zip(offsets.windows(2))
        .map(|(label, band)| {
            let text_height = measure.measure(label, TICK_FONT_SIZE).height;
            CategoryTick {
                label: label.clone(),
                y: top + band[0],
                label_y: top + band[0] + (gap / 2.0).max(text_height / 2.0),
                band_height: band[1] - band[0],
            }
        })
        .collect();

    let title = title.map(|text| {
        let extent = measure.measure(text, TITLE_FONT_SIZE);
        AxisTitle {
            text: text.to_string(),
            x: left + extent.height,
            y: top + height / 2.0,
            rotation: -90.0,
        }
    });

    CategoryAxis {
        x: left + width,
        y: top,
        width,
        height,
        tick_size: TICK_SIZE,
        ticks,
        title,
    }
}

/// Build the time axis below the data area
pub fn time_axis(scale: &TimeScale, left: f64, y: f64, measure: &dyn TextMeasure) -> TimeAxis {
    let (r0, r1) = scale.range();
    let length = r1 - r0;
    let label_height = measure.measure("0", TICK_FONT_SIZE).height;
    let title_height = measure.measure(TIME_AXIS_TITLE, TITLE_FONT_SIZE).height;

    let ticks = scale
        .ticks(tick_count(length))
        .into_iter()
        .map(|value| TimeTick {
            x: left + scale.map(&value),
            label: format_tick(&value),
            value,
        })
        .collect();

    let labels_bottom = TICK_SIZE + TICK_PADDING + label_height;
    TimeAxis {
        x: left,
        y,
        length,
        height: labels_bottom + TIME_TITLE_GAP + title_height,
        tick_size: TICK_SIZE,
        ticks,
        title: AxisTitle {
            text: TIME_AXIS_TITLE.to_string(),
            x: left + length / 2.0,
            y: y + labels_bottom + TIME_TITLE_GAP + title_height,
            rotation: 0.0,
        },
    }
}

/// Lay out legend swatches left to right, centred on `center_x`
pub fn legend(
    series: &[(String, Color)],
    center_x: f64,
    top: f64,
    measure: &dyn TextMeasure,
) -> Legend {
    let padding = KeyPadding::default();
    let mut entries = Vec::with_capacity(series.len());
    let mut x = 0.0;
    let mut height: f64 = 0.0;

    for (label, color) in series {
        let text = measure.measure(label, LEGEND_FONT_SIZE);
        let width = text.width + padding.left + padding.right;
        let entry_height = text.height + padding.top + padding.bottom;
        entries.push(LegendEntry {
            label: label.clone(),
            color: *color,
            x,
            y: top,
            width,
            height: entry_height,
            text_x: x + padding.left,
            text_y: top + text.height + padding.top - padding.bottom * 2.0,
        });
        height = height.max(entry_height);
        x += width + padding.spacing;
    }

    let total_width = if entries.is_empty() {
        0.0
    } else {
        x - padding.spacing
    };
    let origin = center_x - total_width / 2.0;
    for entry in &mut entries {
        entry.x += origin;
        entry.text_x += origin;
    }

    Legend {
        x: origin,
        y: top,
        width: total_width,
        height,
        entries,
    }
}
