//! # ganttview-layout
//!
//! Turns event records into a row-packed Gantt chart layout.
//!
//! This crate provides:
//! - Interval normalization (start/end/duration resolution, extras parsing)
//! - Category and series grouping with a 20-color palette
//! - Greedy row packing inside each category
//! - Time scale, axes and legend geometry
//! - Tooltip and drilldown payloads
//! - The [`GanttChart`] component and its resize debouncer
//!
//! ## Example
//!
//! ```rust
//! use ganttview_core::{ChartConfig, CollectingEmitter, Record};
//! use ganttview_layout::GanttChart;
//!
//! let mut chart = GanttChart::new();
//! chart
//!     .configure(ChartConfig::new().start_field("start").end_field("end"))
//!     .unwrap();
//! chart.set_data(vec![
//!     Record::new().with("start", 0).with("end", 100),
//!     Record::new().with("start", 50).with("end", 80),
//! ]);
//!
//! let layout = chart.layout(&mut CollectingEmitter::new()).unwrap();
//! assert_eq!(layout.bars.len(), 2);
//! ```

pub mod axis;
pub mod chart;
pub mod debounce;
pub mod group;
pub mod interaction;
pub mod normalize;
pub mod pack;
pub mod scale;
pub mod time;

pub use chart::{build_layout, ChartError, GanttChart};
pub use debounce::{ResizeDebouncer, DEFAULT_RESIZE_DEBOUNCE_MS};
pub use group::{palette_color, Grouping, CATEGORY20};
pub use interaction::{drilldown_for, tooltip_for};
pub use normalize::{normalize, Normalizer};
pub use pack::{PackedCategory, Placement, RowPacker};
pub use scale::{format_tick, TimeScale};
pub use time::{date_str, duration_str, parse_datetime};
