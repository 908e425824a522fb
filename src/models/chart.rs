//! Chart specification models
//!
//! Serialized, these match the trace and layout objects a Plotly-style
//! `newPlot(target, data, layout)` call expects.

use serde::Serialize;

use super::prediction::Timestamp;

pub const PREDICTED_PRICES_LABEL: &str = "Predicted Stock Prices";
pub const PREDICTED_PRICES_COLOR: &str = "rgba(75, 192, 192, 1)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
}

/// A single line trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub x: Vec<Timestamp>,
    pub y: Vec<f64>,
    pub mode: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub line: LineStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisType {
    Date,
}

/// Vertical scaling rule; `ToZero` keeps zero as the visible minimum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeMode {
    ToZero,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<AxisType>,
    #[serde(rename = "rangemode", skip_serializing_if = "Option::is_none")]
    pub range_mode: Option<RangeMode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub xaxis: Axis,
    pub yaxis: Axis,
}

/// Everything handed to the plotting primitive for one render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Layout,
}
