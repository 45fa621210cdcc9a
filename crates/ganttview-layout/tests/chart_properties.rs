//! Properties of complete layout passes over generated event sets.

use chrono::Duration;
use ganttview_core::{
    ChartConfig, CollectingEmitter, DiagnosticCode, OverlapRule, Record, Viewport,
};
use ganttview_layout::{build_layout, normalize, GanttChart};

/// Deterministic pseudo-random event set over a few hosts and methods
fn events(count: u32) -> Vec<Record> {
    let hosts = ["web-1", "web-2", "db"];
    let methods = ["GET", "POST", "PUT", "DELETE"];
    (0..count)
        .map(|i| {
            let start = 1_700_000_000 + i64::from((i * 7919) % 3600);
            let length = i64::from((i * 104_729) % 900 + 1);
            Record::new()
                .with("start", start)
                .with("duration", length)
                .with("host", hosts[(i % 3) as usize])
                .with("method", methods[(i % 4) as usize])
        })
        .collect()
}

fn config() -> ChartConfig {
    ChartConfig::new()
        .start_field("start")
        .duration_field("duration")
        .category_field("host")
        .series_field("method")
}

#[test]
fn tasks_respect_interval_invariants() {
    let mut emitter = CollectingEmitter::new();
    let tasks = normalize(&config(), &events(200), &mut emitter).unwrap();
    assert_eq!(tasks.len(), 200);
    for task in &tasks {
        assert!(task.end >= task.start);
        let span = (task.end - task.start).num_milliseconds() as f64 / 1000.0;
        assert!((span - task.duration).abs() < 1e-3);
    }
    assert!(emitter.diagnostics.is_empty());
}

#[test]
fn rows_never_overlap_within_a_category() {
    let mut emitter = CollectingEmitter::new();
    let tasks = normalize(&config(), &events(300), &mut emitter).unwrap();
    let layout = build_layout(
        &tasks,
        &config(),
        Viewport::new(1200.0, 600.0),
        &ganttview_core::ApproxTextMeasure::default(),
    );

    for (i, a) in layout.bars.iter().enumerate() {
        for b in layout.bars.iter().skip(i + 1) {
            if a.category == b.category && a.row == b.row {
                let ta = &tasks[a.task_index];
                let tb = &tasks[b.task_index];
                assert!(
                    !(ta.start < tb.end && tb.start < ta.end),
                    "tasks {} and {} overlap in row {} of {}",
                    a.task_index,
                    b.task_index,
                    a.row,
                    a.category
                );
            }
        }
    }
}

#[test]
fn touching_bars_share_a_row_only_when_half_open() {
    let records = vec![
        Record::new().with("start", 0).with("duration", 10).with("host", "a"),
        Record::new().with("start", 10).with("duration", 10).with("host", "a"),
    ];
    let measure = ganttview_core::ApproxTextMeasure::default();
    let viewport = Viewport::new(900.0, 400.0);
    let tasks = normalize(&config(), &records, &mut CollectingEmitter::new()).unwrap();

    let half_open = build_layout(&tasks, &config(), viewport, &measure);
    let inclusive = build_layout(
        &tasks,
        &config().packing(OverlapRule::Inclusive),
        viewport,
        &measure,
    );
    assert_eq!(half_open.row_count("a"), 1);
    assert_eq!(inclusive.row_count("a"), 2);
}

#[test]
fn layout_is_independent_of_viewport_for_rows() {
    let mut chart = GanttChart::new();
    chart.configure(config()).unwrap();
    chart.set_data(events(80));

    chart.set_viewport(Viewport::new(400.0, 300.0));
    let narrow = chart.layout(&mut CollectingEmitter::new()).unwrap();
    chart.set_viewport(Viewport::new(1600.0, 300.0));
    let wide = chart.layout(&mut CollectingEmitter::new()).unwrap();

    let rows = |layout: &ganttview_core::Layout| -> Vec<(usize, usize)> {
        layout.bars.iter().map(|b| (b.task_index, b.row)).collect()
    };
    assert_eq!(rows(&narrow), rows(&wide));
    assert!(wide.x_axis.ticks.len() >= narrow.x_axis.ticks.len());
}

#[test]
fn nan_records_are_skipped_without_halting() {
    let mut records = events(10);
    records.insert(3, Record::new().with("start", 0).with("duration", f64::NAN));
    records.insert(7, Record::new().with("start", "garbage").with("duration", 5));

    let mut emitter = CollectingEmitter::new();
    let tasks = normalize(&config(), &records, &mut emitter).unwrap();
    assert_eq!(tasks.len(), 10);
    assert_eq!(emitter.count(DiagnosticCode::W001UnresolvableRecord), 2);
    let dropped: Vec<_> = emitter.diagnostics.iter().filter_map(|d| d.record).collect();
    assert_eq!(dropped, vec![3, 7]);
}

#[test]
fn end_and_duration_resolve_backwards() {
    let config = ChartConfig::new()
        .end_field("end")
        .duration_field("duration");
    let records = vec![Record::new().with("end", "2025-01-01T01:00:00Z").with("duration", 3600)];
    let tasks = normalize(&config, &records, &mut CollectingEmitter::new()).unwrap();
    assert_eq!(tasks[0].end - tasks[0].start, Duration::hours(1));
    assert_eq!(tasks[0].start.to_rfc3339(), "2025-01-01T00:00:00+00:00");
}
