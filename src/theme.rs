//! Chart Theme
//!
//! Fixed fonts and colors used when measuring and laying out a row chart.

use serde::Serialize;

use crate::measure::FontStyle;

/// Minimum horizontal distance between value-axis ticks, in pixels
pub const MIN_TICKS_INTERVAL: f64 = 60.0;

/// A text element: font plus fill color
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    pub font: FontStyle,
    pub color: String,
}

impl TextStyle {
    fn bold(size: f64, color: &str) -> Self {
        Self {
            font: FontStyle::new(size, 700),
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalStyle {
    pub label: TextStyle,
    pub line_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartTheme {
    pub axis_ticks: TextStyle,
    pub axis_line_color: String,
    pub grid_color: String,
    pub goal: GoalStyle,
    pub data_labels: TextStyle,
    pub min_ticks_interval: f64,
}

impl Default for ChartTheme {
    fn default() -> Self {
        ChartTheme {
            axis_ticks: TextStyle::bold(12.0, "#949aab"),
            axis_line_color: "#b8bbc3".to_string(),
            grid_color: "#f0f0f0".to_string(),
            goal: GoalStyle {
                label: TextStyle::bold(14.0, "#4c5773"),
                line_color: "#4c5773".to_string(),
            },
            data_labels: TextStyle::bold(12.0, "#4c5773"),
            min_ticks_interval: MIN_TICKS_INTERVAL,
        }
    }
}
