//! Declarative output of a layout pass.
//!
//! All coordinates are absolute pixels on the drawing surface, margins
//! included, so a back end only has to emit the primitives.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::BarMetrics;

/// Size of the drawing surface
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(960.0, 480.0)
    }
}

/// Outer margin around the chart
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::uniform(10.0)
    }
}

/// RGB color, serialized as `#rrggbb`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value
    pub const fn from_u32(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Parse `#rrggbb` or `rrggbb`
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Self::from_u32)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One row of a bar tooltip
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TooltipRow {
    /// Label / value pair, optionally tinted
    Pair {
        label: String,
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<Color>,
    },
    /// Full-width free text
    Note { text: String },
}

/// Tooltip payload of a bar
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Tooltip {
    pub rows: Vec<TooltipRow>,
}

impl Tooltip {
    /// Plain-text rendition, one row per line
    pub fn to_plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| match row {
                TooltipRow::Pair { label, value, .. } => format!("{}: {}", label, value),
                TooltipRow::Note { text } => text.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Request sent to the host when a bar is clicked
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrilldownRequest {
    /// Narrow on a named field value
    Field { name: String, value: String },
    /// Narrow on a time window; `earliest` in epoch seconds, `span` in seconds
    TimeRange {
        name: String,
        earliest: i64,
        span: i64,
    },
}

/// Raw identity attributes attached to a drawn bar
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BarData {
    pub time: Option<f64>,
    pub span: f64,
    pub field: Option<String>,
}

/// A positioned task bar
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bar {
    /// Index of the task in the normalized task list
    pub task_index: usize,
    pub category: String,
    pub series: String,
    /// Row inside the category, 0 at the top
    pub row: usize,
    /// Top of the category band relative to the data area
    pub category_offset: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
    pub fill: Color,
    pub data: BarData,
    pub tooltip: Tooltip,
    pub drilldown: DrilldownRequest,
}

impl Bar {
    /// Point-in-bar test, edges inclusive
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// A labelled tick on the time axis
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeTick {
    pub value: DateTime<Utc>,
    pub x: f64,
    pub label: String,
}

/// Positioned axis title
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AxisTitle {
    pub text: String,
    pub x: f64,
    pub y: f64,
    /// Rotation in degrees around (x, y)
    pub rotation: f64,
}

/// Horizontal time axis below the data area
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeAxis {
    /// Left end of the axis line
    pub x: f64,
    /// Vertical position of the axis line
    pub y: f64,
    pub length: f64,
    /// Height of ticks, labels and title below the line
    pub height: f64,
    pub tick_size: f64,
    pub ticks: Vec<TimeTick>,
    pub title: AxisTitle,
}

/// A category label on the vertical axis
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryTick {
    pub label: String,
    /// Top of the category band
    pub y: f64,
    /// Baseline-centre of the label
    pub label_y: f64,
    pub band_height: f64,
}

/// Vertical category axis left of the data area
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryAxis {
    /// Right edge of the axis (where the data area starts)
    pub x: f64,
    pub y: f64,
    /// Width taken by labels and the optional title
    pub width: f64,
    /// Height of all stacked categories
    pub height: f64,
    pub tick_size: f64,
    pub ticks: Vec<CategoryTick>,
    pub title: Option<AxisTitle>,
}

/// One legend swatch
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text_x: f64,
    pub text_y: f64,
}

/// Series legend centred under the time axis
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Legend {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub entries: Vec<LegendEntry>,
}

/// Complete result of one layout pass
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Layout {
    pub viewport: Viewport,
    pub margin: Margin,
    pub metrics: BarMetrics,
    pub categories: Vec<String>,
    pub series: Vec<String>,
    pub bars: Vec<Bar>,
    pub x_axis: TimeAxis,
    pub y_axis: CategoryAxis,
    pub legend: Option<Legend>,
    /// Height needed to draw everything, margins included
    pub total_height: f64,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Topmost bar under a point; later bars are drawn above earlier ones
    pub fn bar_at(&self, x: f64, y: f64) -> Option<&Bar> {
        self.bars.iter().rev().find(|bar| bar.contains(x, y))
    }

    /// Bars of one category in drawing order
    pub fn bars_in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Bar> {
        self.bars.iter().filter(move |bar| bar.category == category)
    }

    /// Number of rows used by a category
    pub fn row_count(&self, category: &str) -> usize {
        self.bars_in_category(category)
            .map(|bar| bar.row + 1)
            .max()
            .unwrap_or(0)
    }
}
