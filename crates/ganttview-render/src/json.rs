//! JSON export of a layout.

use ganttview_core::{Layout, RenderError, Renderer};

/// Serializes the whole layout for hosts that draw it themselves
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonRenderer {
    pub pretty: bool,
}

impl JsonRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Renderer for JsonRenderer {
    type Output = String;

    fn render(&self, layout: &Layout) -> Result<String, RenderError> {
        let result = if self.pretty {
            serde_json::to_string_pretty(layout)
        } else {
            serde_json::to_string(layout)
        };
        result.map_err(|e| RenderError::Format(format!("Failed to write JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_layout;
    use serde_json::Value;

    #[test]
    fn layout_round_trips_as_json_value() {
        let layout = sample_layout();
        let text = JsonRenderer::new().render(&layout).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["bars"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["categories"][0], "db <primary>");
        assert_eq!(value["bars"][0]["fill"], layout.bars[0].fill.to_string());
        assert_eq!(value["bars"][0]["drilldown"]["kind"], "time_range");
        assert!(value["x_axis"]["ticks"].as_array().is_some());
    }

    #[test]
    fn pretty_output_is_indented() {
        let text = JsonRenderer::pretty().render(&sample_layout()).unwrap();
        assert!(text.contains("\n  \"viewport\""));
    }
}
