//! WebAssembly bindings for the ganttview chart widget
//!
//! The host page owns the clock and the DOM. It feeds configuration and
//! records in, forwards container resizes and animation-frame timestamps,
//! and draws the SVG (or the raw layout) this widget hands back.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use ganttview_core::{
    ChartConfig, CollectingEmitter, Diagnostic, Layout, Record, Renderer, Viewport,
};
use ganttview_layout::{GanttChart, DEFAULT_RESIZE_DEBOUNCE_MS};
use ganttview_render::{HtmlRenderer, SvgRenderer};

/// Initialize panic hook for better error messages in console
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// ============================================================================
// Widget Class
// ============================================================================

/// Gantt chart widget driven by the host page
#[wasm_bindgen]
pub struct GanttWidget {
    chart: GanttChart,
    diagnostics: Vec<Diagnostic>,
    last_error: Option<String>,
    dark_theme: bool,
}

#[wasm_bindgen]
impl GanttWidget {
    /// Create a widget subscribed to resize events with the default debounce window
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let mut chart = GanttChart::new();
        chart.subscribe_resize(DEFAULT_RESIZE_DEBOUNCE_MS);
        Self {
            chart,
            diagnostics: Vec::new(),
            last_error: None,
            dark_theme: false,
        }
    }

    /// Apply a configuration object (`startField`, `showLegend`, ...)
    pub fn configure(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: ChartConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid configuration: {}", e)))?;
        self.configure_internal(config).map_err(|e| JsValue::from_str(&e))
    }

    /// Apply a configuration given as a JSON string
    #[wasm_bindgen(js_name = configureJson)]
    pub fn configure_json(&mut self, json: &str) -> Result<(), JsValue> {
        let config = ganttview_input::parse_config_json(json)
            .map_err(|e| JsValue::from_str(&format!("Invalid configuration: {}", e)))?;
        self.configure_internal(config).map_err(|e| JsValue::from_str(&e))
    }

    /// Replace the dataset with an array of flat records
    #[wasm_bindgen(js_name = setData)]
    pub fn set_data(&mut self, records: JsValue) -> Result<(), JsValue> {
        let records: Vec<Record> = serde_wasm_bindgen::from_value(records)
            .map_err(|e| JsValue::from_str(&format!("Invalid records: {}", e)))?;
        self.set_records(records);
        Ok(())
    }

    /// Replace the dataset from a JSON document (array or `{"results": [...]}`)
    #[wasm_bindgen(js_name = setDataJson)]
    pub fn set_data_json(&mut self, json: &str) -> Result<(), JsValue> {
        self.set_data_json_internal(json)
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Report a container resize; returns true when the viewport changed right away
    pub fn resize(&mut self, width: f64, height: f64, now_ms: f64) -> bool {
        self.chart
            .on_resize(Viewport::new(width, height), to_millis(now_ms))
    }

    /// Advance the clock; returns true when a debounced resize became due
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.chart.tick(to_millis(now_ms))
    }

    /// When the pending resize becomes due, if any
    #[wasm_bindgen(js_name = nextDeadline)]
    pub fn next_deadline(&self) -> Option<f64> {
        self.chart.next_deadline().map(|ms| ms as f64)
    }

    /// Compute the layout and return it as a JS object
    pub fn layout(&mut self) -> Result<JsValue, JsValue> {
        let layout = self.layout_internal().map_err(|e| JsValue::from_str(&e))?;
        serde_wasm_bindgen::to_value(&layout).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Compute the layout and return it as a JSON string
    #[wasm_bindgen(js_name = layoutJson)]
    pub fn layout_json(&mut self) -> Result<String, JsValue> {
        let layout = self.layout_internal().map_err(|e| JsValue::from_str(&e))?;
        serde_json::to_string(&layout).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Render the chart as an SVG string
    #[wasm_bindgen(js_name = renderSvg)]
    pub fn render_svg(&mut self) -> Result<String, JsValue> {
        self.render_internal(&SvgRenderer::new())
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Render the chart as a standalone HTML page
    #[wasm_bindgen(js_name = renderHtml)]
    pub fn render_html(&mut self) -> Result<String, JsValue> {
        let mut renderer = HtmlRenderer::new();
        if self.dark_theme {
            renderer = renderer.dark_theme();
        }
        self.render_internal(&renderer)
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Drilldown request for a click at surface coordinates, or `null`
    pub fn click(&self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        match self.chart.click(x, y) {
            Some(request) => serde_wasm_bindgen::to_value(&request)
                .map_err(|e| JsValue::from_str(&e.to_string())),
            None => Ok(JsValue::NULL),
        }
    }

    /// Diagnostics of the last layout or render as a JSON array
    pub fn diagnostics(&self) -> String {
        let entries: Vec<DiagnosticInfo> =
            self.diagnostics.iter().map(DiagnosticInfo::from).collect();
        serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
    }

    #[wasm_bindgen(js_name = lastError)]
    pub fn last_error(&self) -> Option<String> {
        self.last_error.clone()
    }

    #[wasm_bindgen(js_name = setDarkTheme)]
    pub fn set_dark_theme(&mut self, enabled: bool) {
        self.dark_theme = enabled;
    }

    /// Tear down the resize subscription and drop the dataset
    pub fn dispose(&mut self) {
        self.chart.dispose();
        self.chart.set_data(Vec::new());
        self.diagnostics.clear();
    }
}

// Native entry points; the exported methods above wrap these.
impl GanttWidget {
    pub fn configure_internal(&mut self, config: ChartConfig) -> Result<(), String> {
        let result = self.chart.configure(config).map_err(|e| e.to_string());
        self.last_error = result.as_ref().err().cloned();
        result
    }

    pub fn set_data_json_internal(&mut self, json: &str) -> Result<(), String> {
        let records = ganttview_input::parse_records(json, ganttview_input::RecordFormat::Json)
            .map_err(|e| format!("Invalid records: {}", e))?;
        self.set_records(records);
        Ok(())
    }

    pub fn set_records(&mut self, records: Vec<Record>) {
        self.chart.set_data(records);
    }

    pub fn records(&self) -> &[Record] {
        self.chart.records()
    }

    pub fn layout_internal(&mut self) -> Result<Layout, String> {
        let mut emitter = CollectingEmitter::new();
        let result = self.chart.layout(&mut emitter).map_err(|e| e.to_string());
        self.finish(emitter, &result);
        result
    }

    pub fn render_internal<R>(&mut self, renderer: &R) -> Result<String, String>
    where
        R: Renderer<Output = String>,
    {
        let mut emitter = CollectingEmitter::new();
        let result = self
            .chart
            .render(renderer, &mut emitter)
            .map_err(|e| e.to_string());
        self.finish(emitter, &result);
        result
    }

    pub fn viewport(&self) -> Viewport {
        self.chart.viewport()
    }

    fn finish<T>(&mut self, emitter: CollectingEmitter, result: &Result<T, String>) {
        self.diagnostics = emitter.diagnostics;
        self.last_error = result.as_ref().err().cloned();
    }
}

impl Default for GanttWidget {
    fn default() -> Self {
        Self::new()
    }
}

/// Milliseconds from a JS timestamp; negative and NaN clamp to zero
fn to_millis(now_ms: f64) -> u64 {
    if now_ms.is_finite() && now_ms > 0.0 {
        now_ms as u64
    } else {
        0
    }
}

#[derive(Serialize)]
struct DiagnosticInfo {
    code: String,
    severity: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<usize>,
}

impl From<&Diagnostic> for DiagnosticInfo {
    fn from(d: &Diagnostic) -> Self {
        Self {
            code: d.code.as_str().to_string(),
            severity: d.severity.as_str().to_string(),
            message: d.message.clone(),
            record: d.record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EVENTS: &str = r#"{"results": [
        {"start": 0, "end": 100, "cat": "A", "series": "x"},
        {"start": 50, "end": 80, "cat": "A", "series": "y"},
        {"start": 200, "end": 300, "cat": "A", "series": "x"},
        {"start": "never", "end": 300, "cat": "B", "series": "x"}
    ]}"#;

    fn widget() -> GanttWidget {
        let mut widget = GanttWidget::new();
        widget
            .configure_internal(
                ChartConfig::new()
                    .start_field("start")
                    .end_field("end")
                    .category_field("cat")
                    .series_field("series"),
            )
            .unwrap();
        widget.set_data_json_internal(EVENTS).unwrap();
        widget
    }

    #[test]
    fn layout_packs_rows() {
        let mut widget = widget();
        let layout = widget.layout_internal().unwrap();
        let rows: Vec<usize> = layout.bars.iter().map(|b| b.row).collect();
        assert_eq!(rows, vec![0, 1, 0]);
    }

    #[test]
    fn diagnostics_are_kept_per_pass() {
        let mut widget = widget();
        widget.layout_internal().unwrap();
        let diagnostics: serde_json::Value = serde_json::from_str(&widget.diagnostics()).unwrap();
        assert_eq!(diagnostics[0]["code"], "W001");
        assert_eq!(diagnostics[0]["record"], 3);
        assert_eq!(widget.last_error(), None);
    }

    #[test]
    fn render_svg_string() {
        let mut widget = widget();
        let svg = widget.render_internal(&SvgRenderer::new()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("class=\"bar\"").count(), 3);
    }

    #[test]
    fn configuration_error_is_remembered() {
        let mut widget = GanttWidget::new();
        let err = widget
            .configure_internal(ChartConfig::new().start_field("start"))
            .unwrap_err();
        assert_eq!(
            err,
            "Must specify at least two of: startField, endField, durationField."
        );
        assert_eq!(widget.last_error(), Some(err.clone()));

        assert!(widget.render_internal(&SvgRenderer::new()).is_err());
        assert!(widget.diagnostics().contains("E001"));
    }

    #[test]
    fn resize_is_debounced() {
        let mut widget = widget();
        assert!(!widget.resize(400.0, 300.0, 1000.0));
        assert!(!widget.resize(500.0, 300.0, 1010.0));
        assert_eq!(widget.next_deadline(), Some(1030.0));
        assert!(!widget.tick(1020.0));
        assert!(widget.tick(1030.0));
        assert_eq!(widget.viewport(), Viewport::new(500.0, 300.0));
    }

    #[test]
    fn object_valued_fields_keep_the_batch() {
        let mut widget = widget();
        let records: Vec<Record> = serde_json::from_str(
            r#"[{"start": 0, "end": 10, "cat": "A", "meta": {"pid": 7}},
                {"start": 5, "end": 20, "cat": "B"}]"#,
        )
        .unwrap();
        widget.set_records(records);
        let layout = widget.layout_internal().unwrap();
        assert_eq!(layout.bars.len(), 2);
        assert_eq!(layout.categories, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn dispose_stops_resize_handling() {
        let mut widget = widget();
        widget.dispose();
        assert!(widget.records().is_empty());
        assert_eq!(widget.next_deadline(), None);
        assert!(widget.resize(640.0, 480.0, 0.0));
        assert!(!widget.tick(1_000.0));
    }

    #[test]
    fn bad_record_json_is_an_error() {
        let mut widget = GanttWidget::new();
        let err = widget.set_data_json_internal("{\"rows\": 1}").unwrap_err();
        assert!(err.starts_with("Invalid records"));
    }

    #[test]
    fn timestamps_clamp() {
        assert_eq!(to_millis(-5.0), 0);
        assert_eq!(to_millis(f64::NAN), 0);
        assert_eq!(to_millis(12.9), 12);
    }
}
