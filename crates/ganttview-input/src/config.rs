//! Chart configuration files.
//!
//! Keys use the dashboard option names (`startField`, `showLegend`, ...).
//! A TOML file may hold them at the top level or under a `[chart]` table.

use ganttview_core::ChartConfig;
use serde::Deserialize;
use std::path::Path;

use crate::InputError;

/// A configuration file whose options sit under a `chart` table
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Nested {
    chart: ChartConfig,
}

/// Parse a TOML chart configuration
pub fn parse_config(input: &str) -> Result<ChartConfig, InputError> {
    let table: toml::Table = toml::from_str(input)?;
    let config = if table.contains_key("chart") {
        toml::from_str::<Nested>(input)?.chart
    } else {
        toml::from_str(input)?
    };
    Ok(config)
}

/// Parse a JSON chart configuration
pub fn parse_config_json(input: &str) -> Result<ChartConfig, InputError> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    let config = if value.get("chart").is_some() {
        serde_json::from_str::<Nested>(input)?.chart
    } else {
        serde_json::from_str(input)?
    };
    Ok(config)
}

/// Load a chart configuration file; `.json` files are read as JSON, anything else as TOML
pub fn load_config(path: &Path) -> Result<ChartConfig, InputError> {
    let content = std::fs::read_to_string(path)?;
    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_config_json(&content)?,
        _ => parse_config(&content)?,
    };
    tracing::debug!(path = %path.display(), "loaded chart configuration");
    Ok(config)
}
