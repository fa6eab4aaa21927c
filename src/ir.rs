use serde::Serialize;
use std::collections::BTreeMap;

use crate::data::{DatasetColumn, RowValue};
use crate::scale::{BandScale, ContinuousScale};
use crate::theme::ChartTheme;

// =============================================================================
// Phase 1: Resolution
// =============================================================================

/// A configured column name resolved against the result's columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    pub index: usize,
    pub column: DatasetColumn,
}

/// Column roles, decided once when the configuration is resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ChartColumns {
    /// One metric split into a series per distinct breakout value.
    Breakout {
        dimension: ColumnDescriptor,
        breakout: ColumnDescriptor,
        metric: ColumnDescriptor,
    },
    /// One series per metric column.
    MultipleMetrics {
        dimension: ColumnDescriptor,
        metrics: Vec<ColumnDescriptor>,
    },
}

impl ChartColumns {
    pub fn dimension(&self) -> &ColumnDescriptor {
        match self {
            ChartColumns::Breakout { dimension, .. } => dimension,
            ChartColumns::MultipleMetrics { dimension, .. } => dimension,
        }
    }

    pub fn breakout(&self) -> Option<&ColumnDescriptor> {
        match self {
            ChartColumns::Breakout { breakout, .. } => Some(breakout),
            ChartColumns::MultipleMetrics { .. } => None,
        }
    }

    /// Metric columns whose values are summed by the grouper
    pub fn metrics(&self) -> Vec<&ColumnDescriptor> {
        match self {
            ChartColumns::Breakout { metric, .. } => vec![metric],
            ChartColumns::MultipleMetrics { metrics, .. } => metrics.iter().collect(),
        }
    }
}

// =============================================================================
// Phase 2: Grouping
// =============================================================================

pub type MetricValue = Option<f64>;
pub type MetricDatum = BTreeMap<String, MetricValue>;

/// All rows sharing one dimension value, with their metrics summed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedDatum {
    pub dimension_value: RowValue,
    pub metrics: MetricDatum,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakout: Option<BTreeMap<String, MetricDatum>>,
}

impl GroupedDatum {
    pub fn new(dimension_value: RowValue) -> Self {
        Self {
            dimension_value,
            metrics: MetricDatum::new(),
            breakout: None,
        }
    }
}

pub type GroupedDataset = Vec<GroupedDatum>;

// =============================================================================
// Phase 3: Series
// =============================================================================

/// How a series reads its value out of a grouped datum.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeriesAccessor {
    Metric { metric: String },
    Breakout { breakout_value: String, metric: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesInfo {
    pub metric_column: DatasetColumn,
    pub dimension_column: DatasetColumn,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakout_value: Option<RowValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub key: String,
    pub title: String,
    pub color: String,
    pub accessor: SeriesAccessor,
    pub info: SeriesInfo,
}

impl Series {
    /// Value-axis reading for a datum; missing entries read as null
    pub fn x_value(&self, datum: &GroupedDatum) -> MetricValue {
        match &self.accessor {
            SeriesAccessor::Metric { metric } => datum.metrics.get(metric).copied().flatten(),
            SeriesAccessor::Breakout { breakout_value, metric } => datum
                .breakout
                .as_ref()
                .and_then(|b| b.get(breakout_value))
                .and_then(|m| m.get(metric))
                .copied()
                .flatten(),
        }
    }

    /// Category label for a datum
    pub fn y_value(&self, datum: &GroupedDatum) -> String {
        datum.dimension_value.to_string()
    }
}

// =============================================================================
// Phase 4: Layout
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Margin {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartGoal {
    pub value: f64,
    pub label: String,
}

/// Goal descriptor with its position on the value axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalLine {
    pub value: f64,
    pub label: String,
    pub x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: f64,
    pub position: f64,
    pub label: String,
}

/// A bar rectangle in inner-chart pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarGeometry {
    pub series_index: usize,
    pub datum_index: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Everything a drawing layer needs to paint a row chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowChartLayout {
    pub width: f64,
    pub height: f64,
    pub inner_width: f64,
    pub inner_height: f64,
    pub chart_columns: ChartColumns,
    /// Untrimmed groups, indexed by pointer events.
    pub grouped_data: GroupedDataset,
    pub trimmed_data: GroupedDataset,
    pub series: Vec<Series>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacked: Option<Vec<Vec<(f64, f64)>>>,
    pub category_scale: BandScale,
    pub value_scale: ContinuousScale,
    pub x_ticks: Vec<Tick>,
    pub y_labels: Vec<String>,
    pub margin: Margin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalLine>,
    pub show_value_labels: bool,
    pub bars: Vec<BarGeometry>,
    /// Fonts and colors the layout was measured with.
    pub theme: ChartTheme,
}
