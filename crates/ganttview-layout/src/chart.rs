//! Full layout pass and the chart component.

use chrono::{DateTime, Utc};
use ganttview_core::{
    ApproxTextMeasure, Bar, BarData, ChartConfig, ConfigError, DiagnosticEmitter,
    DrilldownRequest, Layout, Margin, NullEmitter, Record, RenderError, Renderer, Task,
    TextMeasure, Viewport,
};
use thiserror::Error;

use crate::axis::{category_axis, legend, time_axis};
use crate::debounce::ResizeDebouncer;
use crate::group::Grouping;
use crate::interaction::{drilldown_for, tooltip_for};
use crate::normalize::normalize;
use crate::pack::{stack_categories, RowPacker};
use crate::scale::TimeScale;

/// Chart component error
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Lay out normalized tasks on a drawing surface
pub fn build_layout(
    tasks: &[Task],
    config: &ChartConfig,
    viewport: Viewport,
    measure: &dyn TextMeasure,
) -> Layout {
    let metrics = config.bar_metrics();
    let margin = Margin::default();
    let grouping = Grouping::from_tasks(tasks);
    let groups = grouping.tasks_by_category(tasks);

    // Rows per category
    let packer = RowPacker::new(metrics, config.packing);
    let packed: Vec<_> = groups
        .iter()
        .map(|group| {
            let spans: Vec<(f64, f64)> = group
                .iter()
                .map(|&i| (tasks[i].start_millis() as f64, tasks[i].end_millis() as f64))
                .collect();
            packer.pack(&spans)
        })
        .collect();
    let heights: Vec<f64> = packed.iter().map(|p| p.height).collect();
    let offsets = stack_categories(&heights, metrics.spacing);

    let title = config
        .has_category_title()
        .then_some(config.category_label.as_str());
    let y_axis = category_axis(
        &grouping.categories,
        &offsets,
        metrics.gap(),
        title,
        margin.left,
        margin.top,
        measure,
    );

    let inner_width = viewport.width - margin.left - margin.right;
    let available = (inner_width - y_axis.width - margin.left).max(0.0);
    let (first, last) = domain(tasks);
    let scale = TimeScale::new(first, last, (0.0, available));

    let data_x = y_axis.x;
    let data_y = margin.top + metrics.spacing / 2.0;

    let mut bars = Vec::with_capacity(tasks.len());
    for (category_index, group) in groups.iter().enumerate() {
        let category_offset = offsets[category_index];
        for (&task_index, placement) in group.iter().zip(&packed[category_index].placements) {
            let task = &tasks[task_index];
            let fill = grouping.series_color(&task.series);
            let x0 = scale.map(&task.start);
            let x1 = scale.map(&task.end);
            bars.push(Bar {
                task_index,
                category: task.category.clone(),
                series: task.series.clone(),
                row: placement.row,
                category_offset,
                x: data_x + x0,
                y: data_y + category_offset + placement.offset,
                width: x1 - x0,
                height: metrics.height,
                corner_radius: metrics.corner_radius,
                fill,
                data: BarData {
                    time: task.id.time,
                    span: task.id.span,
                    field: task.id.field.clone(),
                },
                tooltip: tooltip_for(task, config, fill),
                drilldown: drilldown_for(task, config),
            });
        }
    }

    let x_axis = time_axis(&scale, data_x, margin.top + y_axis.height, measure);

    let legend = (config.show_legend && !grouping.series.is_empty()).then(|| {
        let entries: Vec<_> = grouping
            .series
            .iter()
            .map(|s| (s.clone(), grouping.series_color(s)))
            .collect();
        legend(
            &entries,
            data_x + available / 2.0,
            x_axis.y + x_axis.height + margin.bottom,
            measure,
        )
    });

    let total_height = margin.top
        + y_axis.height
        + x_axis.height
        + legend
            .as_ref()
            .map_or(0.0, |l| margin.bottom + l.height)
        + margin.bottom;

    tracing::debug!(
        bars = bars.len(),
        categories = grouping.categories.len(),
        series = grouping.series.len(),
        height = total_height,
        "computed layout"
    );

    Layout {
        viewport,
        margin,
        metrics,
        categories: grouping.categories,
        series: grouping.series,
        bars,
        x_axis,
        y_axis,
        legend,
        total_height,
    }
}

/// Earliest start and latest end; the epoch for an empty task list
fn domain(tasks: &[Task]) -> (DateTime<Utc>, DateTime<Utc>) {
    let first = tasks.iter().map(|t| t.start).min();
    let last = tasks.iter().map(|t| t.end).max();
    match (first, last) {
        (Some(first), Some(last)) => (first, last),
        _ => (DateTime::default(), DateTime::default()),
    }
}

/// Gantt chart component.
///
/// Holds the current configuration, dataset and viewport. Every layout is
/// computed fresh from those three; nothing else survives between renders.
#[derive(Debug)]
pub struct GanttChart<M: TextMeasure = ApproxTextMeasure> {
    config: ChartConfig,
    records: Vec<Record>,
    viewport: Viewport,
    measure: M,
    resize: Option<ResizeDebouncer>,
}

impl Default for GanttChart {
    fn default() -> Self {
        Self::new()
    }
}

impl GanttChart {
    pub fn new() -> Self {
        Self::with_measure(ApproxTextMeasure::default())
    }
}

impl<M: TextMeasure> GanttChart<M> {
    pub fn with_measure(measure: M) -> Self {
        Self {
            config: ChartConfig::default(),
            records: Vec::new(),
            viewport: Viewport::default(),
            measure,
            resize: None,
        }
    }

    /// Replace the configuration; the result tells whether it can render
    pub fn configure(&mut self, config: ChartConfig) -> Result<(), ConfigError> {
        self.config = config;
        self.config.validate()
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn set_data(&mut self, records: Vec<Record>) {
        self.records = records;
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resolve the dataset into tasks
    pub fn normalize(&self, emitter: &mut dyn DiagnosticEmitter) -> Result<Vec<Task>, ChartError> {
        Ok(normalize(&self.config, &self.records, emitter)?)
    }

    /// Normalize and lay out the dataset for the current viewport
    pub fn layout(&self, emitter: &mut dyn DiagnosticEmitter) -> Result<Layout, ChartError> {
        let tasks = self.normalize(emitter)?;
        Ok(build_layout(&tasks, &self.config, self.viewport, &self.measure))
    }

    /// Lay out and hand the result to a renderer
    pub fn render<R: Renderer>(
        &self,
        renderer: &R,
        emitter: &mut dyn DiagnosticEmitter,
    ) -> Result<R::Output, ChartError> {
        let layout = self.layout(emitter)?;
        Ok(renderer.render(&layout)?)
    }

    /// Start coalescing resizes with the given quiet window
    pub fn subscribe_resize(&mut self, window_ms: u64) {
        self.resize = Some(ResizeDebouncer::new(window_ms));
    }

    pub fn is_subscribed(&self) -> bool {
        self.resize.is_some()
    }

    /// Report a new viewport size.
    ///
    /// Without a resize subscription the viewport is applied at once and
    /// `true` is returned; otherwise it waits for [`GanttChart::tick`].
    pub fn on_resize(&mut self, viewport: Viewport, now_ms: u64) -> bool {
        match &mut self.resize {
            Some(debouncer) => {
                debouncer.notify(viewport, now_ms);
                false
            }
            None => {
                self.viewport = viewport;
                true
            }
        }
    }

    /// Advance the resize clock; `true` when a re-render is due
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let released = self.resize.as_mut().and_then(|d| d.poll(now_ms));
        match released {
            Some(viewport) => {
                self.viewport = viewport;
                true
            }
            None => false,
        }
    }

    /// When the pending resize becomes due, if any
    pub fn next_deadline(&self) -> Option<u64> {
        self.resize.as_ref().and_then(ResizeDebouncer::deadline)
    }

    /// Drilldown request for the bar under a point, if any
    pub fn click(&self, x: f64, y: f64) -> Option<DrilldownRequest> {
        let layout = self.layout(&mut NullEmitter).ok()?;
        layout.bar_at(x, y).map(|bar| bar.drilldown.clone())
    }

    /// Cancel pending resizes and end the resize subscription
    pub fn dispose(&mut self) {
        if let Some(debouncer) = &mut self.resize {
            debouncer.cancel();
        }
        self.resize = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ganttview_core::{CollectingEmitter, DiagnosticCode, OverlapRule};
    use pretty_assertions::assert_eq;

    fn config() -> ChartConfig {
        ChartConfig::new()
            .start_field("start")
            .end_field("end")
            .category_field("cat")
            .series_field("series")
    }

    fn record(start: i64, end: i64, cat: &str, series: &str) -> Record {
        Record::new()
            .with("start", start)
            .with("end", end)
            .with("cat", cat)
            .with("series", series)
    }

    fn sample() -> Vec<Record> {
        vec![
            record(0, 100, "A", "x"),
            record(50, 80, "A", "y"),
            record(200, 300, "A", "x"),
        ]
    }

    fn rows_by_task(layout: &Layout) -> Vec<usize> {
        let mut rows = vec![0; layout.bars.len()];
        for bar in &layout.bars {
            rows[bar.task_index] = bar.row;
        }
        rows
    }

    #[test]
    fn overlapping_task_moves_to_second_row() {
        let mut chart = GanttChart::new();
        chart.configure(config()).unwrap();
        chart.set_data(sample());
        let layout = chart.layout(&mut CollectingEmitter::new()).unwrap();

        assert_eq!(rows_by_task(&layout), vec![0, 1, 0]);
        assert_eq!(layout.categories, vec!["A"]);
        assert_eq!(layout.series, vec!["x", "y"]);
        assert_eq!(layout.row_count("A"), 2);
    }

    #[test]
    fn bars_span_the_time_axis() {
        let mut chart = GanttChart::new();
        chart.configure(config()).unwrap();
        chart.set_data(sample());
        chart.set_viewport(Viewport::new(800.0, 400.0));
        let layout = chart.layout(&mut CollectingEmitter::new()).unwrap();

        let axis = &layout.x_axis;
        let first = layout.bars.iter().find(|b| b.task_index == 0).unwrap();
        let last = layout.bars.iter().find(|b| b.task_index == 2).unwrap();
        assert!((first.x - axis.x).abs() < 1e-9);
        assert!((last.x + last.width - (axis.x + axis.length)).abs() < 1e-9);
        // inner width minus axis width minus left margin
        let expected = 800.0 - 20.0 - layout.y_axis.width - 10.0;
        assert!((axis.length - expected).abs() < 1e-9);
        assert_eq!(layout.x_axis.y, layout.margin.top + layout.y_axis.height);
    }

    #[test]
    fn categories_stack_in_sorted_order() {
        let mut chart = GanttChart::new();
        chart.configure(config()).unwrap();
        chart.set_data(vec![
            record(0, 10, "b", "x"),
            record(0, 10, "a", "x"),
            record(5, 15, "a", "x"),
        ]);
        let layout = chart.layout(&mut CollectingEmitter::new()).unwrap();

        assert_eq!(layout.categories, vec!["a", "b"]);
        let b_bar = layout.bars.iter().find(|b| b.category == "b").unwrap();
        // category "a" has two rows: 20 + 4 + 20, then 2 * 4 spacing
        assert_eq!(b_bar.category_offset, 52.0);
        assert_eq!(layout.y_axis.ticks[1].y, layout.margin.top + 52.0);
        assert_eq!(layout.y_axis.height, 80.0);
    }

    #[test]
    fn series_colors_and_legend() {
        let mut chart = GanttChart::new();
        chart.configure(config()).unwrap();
        chart.set_data(sample());
        let layout = chart.layout(&mut CollectingEmitter::new()).unwrap();

        let legend = layout.legend.as_ref().unwrap();
        assert_eq!(legend.entries.len(), 2);
        assert_eq!(legend.entries[0].color.to_string(), "#1f77b4");
        assert_eq!(legend.entries[1].color.to_string(), "#aec7e8");
        for bar in &layout.bars {
            let entry = legend.entries.iter().find(|e| e.label == bar.series).unwrap();
            assert_eq!(entry.color, bar.fill);
        }

        chart.configure(config().show_legend(false)).unwrap();
        let layout = chart.layout(&mut CollectingEmitter::new()).unwrap();
        assert!(layout.legend.is_none());
    }

    #[test]
    fn compact_mode_uses_small_bars() {
        let mut chart = GanttChart::new();
        chart.configure(config().compact(true)).unwrap();
        chart.set_data(sample());
        let layout = chart.layout(&mut CollectingEmitter::new()).unwrap();
        assert!(layout.bars.iter().all(|b| b.height == 5.0 && b.corner_radius == 0.0));
        let second_row = layout.bars.iter().find(|b| b.row == 1).unwrap();
        assert_eq!(second_row.y - layout.margin.top - 0.5, 6.0);
    }

    #[test]
    fn inclusive_packing_separates_touching_bars() {
        let records = vec![record(0, 10, "A", "x"), record(10, 20, "A", "x")];
        let mut chart = GanttChart::new();
        chart.set_data(records);

        chart.configure(config()).unwrap();
        let layout = chart.layout(&mut CollectingEmitter::new()).unwrap();
        assert_eq!(layout.row_count("A"), 1);

        chart.configure(config().packing(OverlapRule::Inclusive)).unwrap();
        let layout = chart.layout(&mut CollectingEmitter::new()).unwrap();
        assert_eq!(layout.row_count("A"), 2);
    }

    #[test]
    fn layout_is_deterministic() {
        let mut chart = GanttChart::new();
        chart.configure(config()).unwrap();
        chart.set_data(sample());
        let first = chart.layout(&mut CollectingEmitter::new()).unwrap();
        let second = chart.layout(&mut CollectingEmitter::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn config_error_yields_no_chart() {
        let mut chart = GanttChart::new();
        assert!(chart
            .configure(ChartConfig::new().start_field("start"))
            .is_err());
        chart.set_data(sample());

        let mut emitter = CollectingEmitter::new();
        let result = chart.layout(&mut emitter);
        assert!(matches!(result, Err(ChartError::Config(_))));
        assert_eq!(emitter.count(DiagnosticCode::E001InsufficientTimeFields), 1);
        assert_eq!(
            result.unwrap_err().to_string(),
            "Must specify at least two of: startField, endField, durationField."
        );
    }

    #[test]
    fn empty_dataset_lays_out_an_empty_chart() {
        let mut chart = GanttChart::new();
        chart.configure(config()).unwrap();
        let mut emitter = CollectingEmitter::new();
        let layout = chart.layout(&mut emitter).unwrap();
        assert!(layout.is_empty());
        assert!(layout.legend.is_none());
        assert_eq!(emitter.count(DiagnosticCode::W002EmptyDataset), 1);
    }

    #[test]
    fn custom_category_label_adds_axis_title() {
        let mut chart = GanttChart::new();
        chart.configure(config()).unwrap();
        chart.set_data(sample());
        let plain = chart.layout(&mut CollectingEmitter::new()).unwrap();
        assert!(plain.y_axis.title.is_none());

        chart.configure(config().category_label("Host")).unwrap();
        let titled = chart.layout(&mut CollectingEmitter::new()).unwrap();
        assert_eq!(titled.y_axis.title.as_ref().unwrap().text, "Host");
        assert!(titled.y_axis.width > plain.y_axis.width);
    }

    #[test]
    fn click_hits_bar_drilldown() {
        let mut chart = GanttChart::new();
        chart.configure(config().drilldown_field("cat")).unwrap();
        chart.set_data(sample());
        let layout = chart.layout(&mut CollectingEmitter::new()).unwrap();
        let bar = &layout.bars[0];

        let request = chart.click(bar.x + 1.0, bar.y + 1.0);
        assert_eq!(
            request,
            Some(DrilldownRequest::Field {
                name: "cat".into(),
                value: "A".into()
            })
        );
        assert_eq!(chart.click(-100.0, -100.0), None);
    }

    #[test]
    fn resize_is_debounced_until_quiet() {
        let mut chart = GanttChart::new();
        chart.subscribe_resize(20);
        assert!(!chart.on_resize(Viewport::new(500.0, 300.0), 0));
        assert!(!chart.on_resize(Viewport::new(600.0, 300.0), 10));
        assert!(!chart.tick(25));
        assert_eq!(chart.next_deadline(), Some(30));
        assert!(chart.tick(30));
        assert_eq!(chart.viewport(), Viewport::new(600.0, 300.0));
        assert!(!chart.tick(60));
    }

    #[test]
    fn dispose_cancels_pending_resize() {
        let mut chart = GanttChart::new();
        let before = chart.viewport();
        chart.subscribe_resize(20);
        chart.on_resize(Viewport::new(10.0, 10.0), 0);
        chart.dispose();
        assert!(!chart.is_subscribed());
        assert!(!chart.tick(100));
        assert_eq!(chart.viewport(), before);

        // Unsubscribed resizes apply at once
        assert!(chart.on_resize(Viewport::new(10.0, 10.0), 200));
        assert_eq!(chart.viewport(), Viewport::new(10.0, 10.0));
    }
}
