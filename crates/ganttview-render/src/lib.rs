//! # ganttview-render
//!
//! Rendering backends for ganttview layouts.
//!
//! This crate provides:
//! - SVG chart rendering with native `<title>` tooltips
//! - Standalone interactive HTML rendering (hover tooltips, click drilldown)
//! - JSON export of the full layout
//!
//! ## Example
//!
//! ```rust,ignore
//! use ganttview_core::Renderer;
//! use ganttview_render::{HtmlRenderer, JsonRenderer, SvgRenderer};
//!
//! let svg = SvgRenderer::default().render(&layout)?;
//! let html = HtmlRenderer::new().title("Requests").render(&layout)?;
//! let json = JsonRenderer::pretty().render(&layout)?;
//! ```

pub mod html;
pub mod json;

pub use html::{HtmlRenderer, HtmlTheme};
pub use json::JsonRenderer;

use ganttview_core::{
    Bar, CategoryAxis, DrilldownRequest, Layout, Legend, RenderError, Renderer, TimeAxis,
};
use svg::node::element::{Group, Line, Rectangle, Text, Title};
use svg::Document;

/// Message drawn in place of the chart when there is nothing to show
pub const NO_RESULTS_MESSAGE: &str = "No results found.";

/// SVG chart renderer configuration
#[derive(Clone, Debug)]
pub struct SvgRenderer {
    /// Font family for all labels
    pub font_family: String,
    /// Axis label and title color
    pub text_color: String,
    /// Axis line and tick color
    pub axis_color: String,
    /// Legend label color, drawn on the series swatch
    pub legend_text_color: String,
    /// Background fill; transparent when unset
    pub background_color: Option<String>,
    pub tick_font_size: f64,
    pub title_font_size: f64,
    pub legend_font_size: f64,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            font_family: "Helvetica, Arial, sans-serif".into(),
            text_color: "#333333".into(),
            axis_color: "#999999".into(),
            legend_text_color: "#ffffff".into(),
            background_color: None,
            tick_font_size: 11.0,
            title_font_size: 12.0,
            legend_font_size: 12.0,
        }
    }
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the whole surface with a background color
    pub fn background(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// Configure the label font family
    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Configure label and axis colors
    pub fn colors(mut self, text: impl Into<String>, axis: impl Into<String>) -> Self {
        self.text_color = text.into();
        self.axis_color = axis.into();
        self
    }

    /// Height of the emitted document
    fn document_height(layout: &Layout) -> f64 {
        if layout.is_empty() {
            layout.viewport.height
        } else {
            layout.total_height
        }
    }

    /// Build the SVG document for a layout
    pub fn document(&self, layout: &Layout) -> Document {
        let width = px(layout.viewport.width);
        let height = px(Self::document_height(layout));

        let mut document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0, 0, width, height))
            .set("class", "ganttview")
            .set("font-family", self.font_family.as_str());

        if let Some(color) = &self.background_color {
            document = document.add(
                Rectangle::new()
                    .set("width", "100%")
                    .set("height", "100%")
                    .set("fill", color.as_str()),
            );
        }

        if layout.is_empty() {
            return document.add(
                Text::new(NO_RESULTS_MESSAGE)
                    .set("class", "empty")
                    .set("x", px(width / 2.0))
                    .set("y", px(height / 2.0))
                    .set("text-anchor", "middle")
                    .set("dominant-baseline", "middle")
                    .set("font-size", self.title_font_size)
                    .set("fill", self.text_color.as_str()),
            );
        }

        document = document
            .add(self.render_category_axis(&layout.y_axis))
            .add(self.render_time_axis(&layout.x_axis));

        let mut bars = Group::new().set("class", "bars");
        for (index, bar) in layout.bars.iter().enumerate() {
            bars = bars.add(self.render_bar(index, bar));
        }
        document = document.add(bars);

        if let Some(legend) = &layout.legend {
            document = document.add(self.render_legend(legend));
        }

        document
    }

    fn render_category_axis(&self, axis: &CategoryAxis) -> Group {
        let mut group = Group::new().set("class", "axis y-axis");

        group = group.add(
            Line::new()
                .set("x1", px(axis.x))
                .set("y1", px(axis.y))
                .set("x2", px(axis.x))
                .set("y2", px(axis.y + axis.height))
                .set("stroke", self.axis_color.as_str()),
        );

        for tick in &axis.ticks {
            group = group
                .add(
                    Line::new()
                        .set("x1", px(axis.x - axis.tick_size))
                        .set("y1", px(tick.label_y))
                        .set("x2", px(axis.x))
                        .set("y2", px(tick.label_y))
                        .set("stroke", self.axis_color.as_str()),
                )
                .add(
                    Text::new(tick.label.as_str())
                        .set("x", px(axis.x - axis.tick_size - 3.0))
                        .set("y", px(tick.label_y))
                        .set("text-anchor", "end")
                        .set("dominant-baseline", "middle")
                        .set("font-size", self.tick_font_size)
                        .set("fill", self.text_color.as_str()),
                );
        }

        if let Some(title) = &axis.title {
            group = group.add(
                Text::new(title.text.as_str())
                    .set("class", "axis-title")
                    .set("x", px(title.x))
                    .set("y", px(title.y))
                    .set(
                        "transform",
                        format!("rotate({} {} {})", title.rotation, px(title.x), px(title.y)),
                    )
                    .set("text-anchor", "middle")
                    .set("font-size", self.title_font_size)
                    .set("fill", self.text_color.as_str()),
            );
        }

        group
    }

    fn render_time_axis(&self, axis: &TimeAxis) -> Group {
        let mut group = Group::new().set("class", "axis x-axis");

        group = group.add(
            Line::new()
                .set("x1", px(axis.x))
                .set("y1", px(axis.y))
                .set("x2", px(axis.x + axis.length))
                .set("y2", px(axis.y))
                .set("stroke", self.axis_color.as_str()),
        );

        for tick in &axis.ticks {
            group = group
                .add(
                    Line::new()
                        .set("x1", px(tick.x))
                        .set("y1", px(axis.y))
                        .set("x2", px(tick.x))
                        .set("y2", px(axis.y + axis.tick_size))
                        .set("stroke", self.axis_color.as_str()),
                )
                .add(
                    Text::new(tick.label.as_str())
                        .set("x", px(tick.x))
                        .set("y", px(axis.y + axis.tick_size + 3.0))
                        .set("text-anchor", "middle")
                        .set("dominant-baseline", "hanging")
                        .set("font-size", self.tick_font_size)
                        .set("fill", self.text_color.as_str()),
                );
        }

        group.add(
            Text::new(axis.title.text.as_str())
                .set("class", "axis-title")
                .set("x", px(axis.title.x))
                .set("y", px(axis.title.y))
                .set("text-anchor", "middle")
                .set("font-size", self.title_font_size)
                .set("fill", self.text_color.as_str()),
        )
    }

    /// Render a single task bar with its hover title and identity attributes
    fn render_bar(&self, index: usize, bar: &Bar) -> Rectangle {
        let mut rect = Rectangle::new()
            .set("class", "bar")
            .set("data-index", index)
            .set("x", px(bar.x))
            .set("y", px(bar.y))
            .set("width", px(bar.width))
            .set("height", px(bar.height))
            .set("fill", bar.fill.to_string())
            .set("data-category", bar.category.as_str())
            .set("data-series", bar.series.as_str())
            .set("data-span", bar.data.span);

        if bar.corner_radius > 0.0 {
            rect = rect
                .set("rx", bar.corner_radius)
                .set("ry", bar.corner_radius);
        }
        if let Some(time) = bar.data.time {
            rect = rect.set("data-time", time);
        }
        if let Some(field) = &bar.data.field {
            rect = rect.set("data-field", field.as_str());
        }
        rect = match &bar.drilldown {
            DrilldownRequest::Field { name, value } => rect
                .set("data-drilldown-name", name.as_str())
                .set("data-drilldown-value", value.as_str()),
            DrilldownRequest::TimeRange {
                name,
                earliest,
                span,
            } => rect
                .set("data-drilldown-name", name.as_str())
                .set("data-drilldown-earliest", *earliest)
                .set("data-drilldown-span", *span),
        };

        rect.add(Title::new(bar.tooltip.to_plain_text()))
    }

    fn render_legend(&self, legend: &Legend) -> Group {
        let mut group = Group::new().set("class", "legend");
        for entry in &legend.entries {
            group = group
                .add(
                    Rectangle::new()
                        .set("x", px(entry.x))
                        .set("y", px(entry.y))
                        .set("width", px(entry.width))
                        .set("height", px(entry.height))
                        .set("rx", 3)
                        .set("ry", 3)
                        .set("fill", entry.color.to_string()),
                )
                .add(
                    Text::new(entry.label.as_str())
                        .set("x", px(entry.text_x))
                        .set("y", px(entry.text_y))
                        .set("font-size", self.legend_font_size)
                        .set("fill", self.legend_text_color.as_str()),
                );
        }
        group
    }
}

impl Renderer for SvgRenderer {
    type Output = String;

    fn render(&self, layout: &Layout) -> Result<String, RenderError> {
        let document = self.document(layout);

        let mut output = Vec::new();
        svg::write(&mut output, &document)
            .map_err(|e| RenderError::Format(format!("Failed to write SVG: {}", e)))?;

        tracing::debug!(bars = layout.bars.len(), bytes = output.len(), "rendered svg");
        String::from_utf8(output).map_err(|e| RenderError::Format(format!("Invalid UTF-8: {}", e)))
    }
}

/// Round a coordinate to two decimals for compact output
fn px(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// HTML-escape a string
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
