//! Interactive HTML chart renderer
//!
//! Generates a standalone HTML page around the SVG chart.
//! Features:
//! - Hover tooltips built from the layout's tooltip rows
//! - Series-tinted tooltip values
//! - Click drilldown, posted to the embedding page and dispatched as a DOM event

use ganttview_core::{Layout, RenderError, Renderer, Tooltip, TooltipRow};
use serde_json::json;

use crate::{html_escape, SvgRenderer};

/// Color theme for the page around the chart
#[derive(Clone, Debug)]
pub struct HtmlTheme {
    pub background_color: String,
    pub text_color: String,
    pub axis_color: String,
    pub tooltip_background: String,
    pub tooltip_text: String,
    pub tooltip_label: String,
}

impl Default for HtmlTheme {
    fn default() -> Self {
        Self::light()
    }
}

impl HtmlTheme {
    pub fn light() -> Self {
        Self {
            background_color: "#ffffff".into(),
            text_color: "#333333".into(),
            axis_color: "#999999".into(),
            tooltip_background: "rgba(0,0,0,0.85)".into(),
            tooltip_text: "#ffffff".into(),
            tooltip_label: "#cccccc".into(),
        }
    }

    pub fn dark() -> Self {
        Self {
            background_color: "#1a1a2e".into(),
            text_color: "#eaeaea".into(),
            axis_color: "#7f8c8d".into(),
            tooltip_background: "rgba(255,255,255,0.92)".into(),
            tooltip_text: "#1a1a2e".into(),
            tooltip_label: "#555555".into(),
        }
    }
}

/// HTML chart renderer configuration
#[derive(Clone, Debug)]
pub struct HtmlRenderer {
    /// Page title and heading
    pub title: String,
    pub theme: HtmlTheme,
    /// Enable tooltips and click drilldown
    pub interactive: bool,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self {
            title: "Gantt Chart".into(),
            theme: HtmlTheme::default(),
            interactive: true,
        }
    }
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use dark theme
    pub fn dark_theme(mut self) -> Self {
        self.theme = HtmlTheme::dark();
        self
    }

    /// Configure the page title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Disable interactivity
    pub fn static_chart(mut self) -> Self {
        self.interactive = false;
        self
    }

    fn svg_renderer(&self) -> SvgRenderer {
        SvgRenderer::new().colors(
            self.theme.text_color.as_str(),
            self.theme.axis_color.as_str(),
        )
    }

    fn generate_html(&self, layout: &Layout) -> Result<String, RenderError> {
        let svg_content = self.svg_renderer().document(layout).to_string();
        let css = self.generate_css();
        let js = if self.interactive && !layout.is_empty() {
            self.generate_js(layout)?
        } else {
            String::new()
        };

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
    <div class="gantt-container">
        <h1>{title}</h1>
        <div class="gantt-wrapper" id="gantt-wrapper">
{svg_content}
        </div>
        <div id="tooltip" class="tooltip"></div>
    </div>
    <script>
{js}
    </script>
</body>
</html>"#,
            title = html_escape(&self.title),
            css = css,
            svg_content = svg_content,
            js = js,
        ))
    }

    fn generate_css(&self) -> String {
        format!(
            r#"        :root {{
            --bg-color: {bg};
            --text-color: {text};
            --tooltip-bg: {tooltip_bg};
            --tooltip-text: {tooltip_text};
            --tooltip-label: {tooltip_label};
        }}
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: Helvetica, Arial, sans-serif;
            background: var(--bg-color);
            color: var(--text-color);
            padding: 20px;
        }}
        .gantt-container h1 {{
            font-size: 1.25rem;
            font-weight: 600;
            margin-bottom: 12px;
        }}
        .gantt-wrapper {{
            overflow: auto;
        }}
        .bar {{
            cursor: pointer;
        }}
        .bar:hover {{
            opacity: 0.8;
        }}
        .tooltip {{
            position: fixed;
            background: var(--tooltip-bg);
            color: var(--tooltip-text);
            padding: 8px 10px;
            border-radius: 4px;
            font-size: 12px;
            pointer-events: none;
            opacity: 0;
            z-index: 1000;
            max-width: 400px;
        }}
        .tooltip.visible {{
            opacity: 1;
        }}
        .tooltip th {{
            color: var(--tooltip-label);
            font-weight: normal;
            text-align: left;
            padding-right: 10px;
            vertical-align: top;
        }}
        .tooltip td {{
            word-break: break-all;
        }}"#,
            bg = self.theme.background_color,
            text = self.theme.text_color,
            tooltip_bg = self.theme.tooltip_background,
            tooltip_text = self.theme.tooltip_text,
            tooltip_label = self.theme.tooltip_label,
        )
    }

    /// Generate JavaScript for tooltips and drilldown
    fn generate_js(&self, layout: &Layout) -> Result<String, RenderError> {
        let bars: Vec<_> = layout
            .bars
            .iter()
            .map(|bar| {
                json!({
                    "tooltip": tooltip_html(&bar.tooltip),
                    "drilldown": bar.drilldown,
                })
            })
            .collect();
        let bar_data = serde_json::to_string(&bars)
            .map_err(|e| RenderError::Format(format!("Failed to encode bar data: {}", e)))?
            .replace("</", "<\\/");

        Ok(format!(
            r#"        const barData = {bar_data};
        const tooltip = document.getElementById('tooltip');

        document.querySelectorAll('.bar').forEach(bar => {{
            const data = barData[Number(bar.getAttribute('data-index'))];
            if (!data) return;

            bar.addEventListener('mouseenter', () => {{
                tooltip.innerHTML = data.tooltip;
                tooltip.classList.add('visible');
            }});

            bar.addEventListener('mousemove', (e) => {{
                tooltip.style.left = (e.clientX + 15) + 'px';
                tooltip.style.top = (e.clientY + 15) + 'px';
            }});

            bar.addEventListener('mouseleave', () => {{
                tooltip.classList.remove('visible');
            }});

            bar.addEventListener('click', () => {{
                const detail = data.drilldown;
                document.dispatchEvent(new CustomEvent('ganttview:drilldown', {{ detail }}));
                if (window.parent !== window) {{
                    window.parent.postMessage({{ type: 'ganttview:drilldown', detail }}, '*');
                }}
            }});
        }});"#,
            bar_data = bar_data,
        ))
    }
}

impl Renderer for HtmlRenderer {
    type Output = String;

    fn render(&self, layout: &Layout) -> Result<String, RenderError> {
        self.generate_html(layout)
    }
}

/// Tooltip rows as an HTML table
pub fn tooltip_html(tooltip: &Tooltip) -> String {
    let mut html = String::from("<table>");
    for row in &tooltip.rows {
        match row {
            TooltipRow::Pair {
                label,
                value,
                color: Some(color),
            } => html.push_str(&format!(
                r#"<tr><th>{}</th><td style="color:{}">{}</td></tr>"#,
                html_escape(label),
                color,
                html_escape(value)
            )),
            TooltipRow::Pair { label, value, .. } => html.push_str(&format!(
                "<tr><th>{}</th><td>{}</td></tr>",
                html_escape(label),
                html_escape(value)
            )),
            TooltipRow::Note { text } => html.push_str(&format!(
                r#"<tr><td colspan="2">{}</td></tr>"#,
                html_escape(text)
            )),
        }
    }
    html.push_str("</table>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{config, layout_of, sample_layout};
    use crate::NO_RESULTS_MESSAGE;
    use ganttview_core::{Color, Record};
    use pretty_assertions::assert_eq;

    #[test]
    fn html_renderer_creation() {
        let renderer = HtmlRenderer::new();
        assert_eq!(renderer.title, "Gantt Chart");
        assert!(renderer.interactive);
    }

    #[test]
    fn html_with_dark_theme() {
        let renderer = HtmlRenderer::new().dark_theme();
        assert_eq!(renderer.theme.background_color, "#1a1a2e");
    }

    #[test]
    fn html_produces_valid_page() {
        let html = HtmlRenderer::new()
            .title("Requests & Jobs")
            .render(&sample_layout())
            .unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("</html>"));
        assert!(html.contains("<title>Requests &amp; Jobs</title>"));
        assert!(html.contains("<svg"));
        assert!(html.contains("</svg>"));
    }

    #[test]
    fn html_includes_interactivity() {
        let html = HtmlRenderer::new().render(&sample_layout()).unwrap();
        assert!(html.contains("barData"));
        assert!(html.contains("ganttview:drilldown"));
        assert!(html.contains(r#""kind":"time_range""#));
    }

    #[test]
    fn html_static_mode() {
        let html = HtmlRenderer::new()
            .static_chart()
            .render(&sample_layout())
            .unwrap();
        assert!(!html.contains("barData"));
    }

    #[test]
    fn html_empty_layout_shows_message() {
        let layout = layout_of(config(), vec![]);
        let html = HtmlRenderer::new().render(&layout).unwrap();
        assert!(html.contains(NO_RESULTS_MESSAGE));
        assert!(!html.contains("barData"));
    }

    #[test]
    fn html_script_cannot_be_closed_by_data() {
        let layout = layout_of(
            config(),
            vec![Record::new()
                .with("start", 0)
                .with("end", 10)
                .with("extras", "</script><b>")],
        );
        let html = HtmlRenderer::new().render(&layout).unwrap();
        assert_eq!(html.matches("</script>").count(), 1);
    }

    #[test]
    fn tooltip_table_rows() {
        let tooltip = Tooltip {
            rows: vec![
                TooltipRow::Pair {
                    label: "Method".into(),
                    value: "GET".into(),
                    color: Some(Color::from_u32(0x1f77b4)),
                },
                TooltipRow::Pair {
                    label: "Host".into(),
                    value: "a<b".into(),
                    color: None,
                },
                TooltipRow::Note {
                    text: "raw".into(),
                },
            ],
        };
        assert_eq!(
            tooltip_html(&tooltip),
            concat!(
                "<table>",
                r#"<tr><th>Method</th><td style="color:#1f77b4">GET</td></tr>"#,
                "<tr><th>Host</th><td>a&lt;b</td></tr>",
                r#"<tr><td colspan="2">raw</td></tr>"#,
                "</table>"
            )
        );
    }
}
