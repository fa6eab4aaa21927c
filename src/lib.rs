// Library exports for rowchart

pub mod csv_reader;
pub mod data;
pub mod error;
pub mod palette;
pub mod settings;

// Pipeline stages
pub mod ir;
pub mod resolve;
pub mod transform;
pub mod series;
pub mod stack;
pub mod scale;
pub mod measure;
pub mod format;
pub mod theme;
pub mod layout;
pub mod events;

use serde::Deserialize;

pub use data::{DatasetColumn, RowValue, TabularResult};
pub use error::{ChartError, ChartResult};
pub use events::{ClickData, HoverData};
pub use ir::RowChartLayout;
pub use layout::build_row_chart;
pub use measure::{FontStyle, HeuristicTextMeasurer, TextMeasurer};
pub use settings::VisualizationSettings;

/// Pixel size of the chart, margins included.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_width() -> u32 { 620 }
fn default_height() -> u32 { 440 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}
