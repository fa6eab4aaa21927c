//! Event Mapper
//!
//! Translates a `(series, datum)` pair picked by the pointer back into column
//! terms for drill-down (click) and tooltips (hover).

use serde::Serialize;

use crate::data::{DatasetColumn, RowValue};
use crate::ir::{ChartColumns, GroupedDatum, MetricValue, RowChartLayout, Series};

/// One dimension the clicked bar belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionValue {
    pub column: DatasetColumn,
    pub value: Option<RowValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickData {
    pub value: MetricValue,
    pub column: DatasetColumn,
    /// Dimension first, then the breakout when present
    pub dimensions: Vec<DimensionValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverRow {
    pub key: String,
    pub value: RowValue,
    pub column: DatasetColumn,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverData {
    pub series_index: usize,
    pub datum_index: usize,
    pub rows: Vec<HoverRow>,
}

fn metric_row_value(value: MetricValue) -> RowValue {
    value.map(RowValue::Number).unwrap_or_default()
}

fn lookup<'a>(
    series: &'a [Series],
    data: &'a [GroupedDatum],
    series_index: usize,
    datum_index: usize,
) -> Option<(&'a Series, &'a GroupedDatum)> {
    Some((series.get(series_index)?, data.get(datum_index)?))
}

/// Drill-down description of a clicked bar; `None` when either index is out of range
pub fn click_data(
    columns: &ChartColumns,
    series: &[Series],
    data: &[GroupedDatum],
    series_index: usize,
    datum_index: usize,
) -> Option<ClickData> {
    let (clicked, datum) = lookup(series, data, series_index, datum_index)?;

    let mut dimensions = vec![DimensionValue {
        column: columns.dimension().column.clone(),
        value: Some(datum.dimension_value.clone()),
    }];
    if let Some(breakout) = columns.breakout() {
        dimensions.push(DimensionValue {
            column: breakout.column.clone(),
            value: clicked.info.breakout_value.clone(),
        });
    }

    Some(ClickData {
        value: clicked.x_value(datum),
        column: clicked.info.metric_column.clone(),
        dimensions,
    })
}

/// Tooltip rows for a hovered bar; `None` when either index is out of range
pub fn hover_data(
    columns: &ChartColumns,
    series: &[Series],
    data: &[GroupedDatum],
    series_index: usize,
    datum_index: usize,
) -> Option<HoverData> {
    let (hovered, datum) = lookup(series, data, series_index, datum_index)?;
    let dimension = &columns.dimension().column;

    let mut rows = vec![HoverRow {
        key: dimension.display_name.clone(),
        value: datum.dimension_value.clone(),
        column: dimension.clone(),
    }];

    match columns {
        ChartColumns::Breakout {
            breakout, metric, ..
        } => {
            rows.push(HoverRow {
                key: breakout.column.display_name.clone(),
                value: RowValue::Text(hovered.title.clone()),
                column: breakout.column.clone(),
            });
            rows.push(HoverRow {
                key: metric.column.display_name.clone(),
                value: metric_row_value(hovered.x_value(datum)),
                column: metric.column.clone(),
            });
        }
        ChartColumns::MultipleMetrics { .. } => {
            rows.push(HoverRow {
                key: hovered.title.clone(),
                value: metric_row_value(hovered.x_value(datum)),
                column: hovered.info.metric_column.clone(),
            });
        }
    }

    Some(HoverData {
        series_index,
        datum_index,
        rows,
    })
}

impl RowChartLayout {
    /// Click description for a bar, indexed like [`RowChartLayout::bars`]
    pub fn click_data(&self, series_index: usize, datum_index: usize) -> Option<ClickData> {
        click_data(
            &self.chart_columns,
            &self.series,
            &self.trimmed_data,
            series_index,
            datum_index,
        )
    }

    /// Hover description for a bar, indexed like [`RowChartLayout::bars`]
    pub fn hover_data(&self, series_index: usize, datum_index: usize) -> Option<HoverData> {
        hover_data(
            &self.chart_columns,
            &self.series,
            &self.trimmed_data,
            series_index,
            datum_index,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ColumnDescriptor;
    use crate::palette::ColorPalette;
    use crate::series::build_series;
    use crate::settings::{SeriesSettings, VisualizationSettings};
    use crate::transform::group_dataset;

    fn descriptor(index: usize, name: &str, display: &str, base_type: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            index,
            column: DatasetColumn::new(name, base_type).with_display_name(display),
        }
    }

    fn breakout_fixture() -> (ChartColumns, Vec<Series>, Vec<GroupedDatum>) {
        let columns = ChartColumns::Breakout {
            dimension: descriptor(0, "category", "Category", "type/Text"),
            breakout: descriptor(1, "year", "Year", "type/Integer"),
            metric: descriptor(2, "count", "Count", "type/Integer"),
        };
        let rows = vec![
            vec!["Gizmo".into(), 2023.0.into(), 4.0.into()],
            vec!["Widget".into(), 2024.0.into(), 7.0.into()],
        ];
        let series = build_series(
            &rows,
            &columns,
            &VisualizationSettings::default(),
            &ColorPalette::default(),
        );
        let data = group_dataset(&rows, &columns);
        (columns, series, data)
    }

    #[test]
    fn test_click_breakout() {
        let (columns, series, data) = breakout_fixture();
        let click = click_data(&columns, &series, &data, 1, 1).unwrap();

        assert_eq!(click.value, Some(7.0));
        assert_eq!(click.column.name, "count");
        assert_eq!(click.dimensions.len(), 2);
        assert_eq!(click.dimensions[0].column.name, "category");
        assert_eq!(click.dimensions[0].value, Some(RowValue::from("Widget")));
        assert_eq!(click.dimensions[1].column.name, "year");
        assert_eq!(click.dimensions[1].value, Some(RowValue::Number(2024.0)));
    }

    #[test]
    fn test_click_missing_breakout_value() {
        let (columns, series, data) = breakout_fixture();
        // 2023 never occurs for Widget
        let click = click_data(&columns, &series, &data, 0, 1).unwrap();
        assert_eq!(click.value, None);
    }

    #[test]
    fn test_hover_breakout() {
        let (columns, series, data) = breakout_fixture();
        let hover = hover_data(&columns, &series, &data, 0, 0).unwrap();

        let keys: Vec<&str> = hover.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Category", "Year", "Count"]);
        assert_eq!(hover.rows[1].value, RowValue::from("2023"));
        assert_eq!(hover.rows[2].value, RowValue::Number(4.0));
        assert_eq!(hover.series_index, 0);
        assert_eq!(hover.datum_index, 0);
    }

    #[test]
    fn test_hover_breakout_uses_series_title() {
        let (columns, _, data) = breakout_fixture();
        let mut settings = VisualizationSettings::default();
        settings.series_settings.insert(
            "2023".to_string(),
            SeriesSettings {
                color: None,
                title: Some("FY 2023".to_string()),
            },
        );
        let rows = vec![
            vec!["Gizmo".into(), 2023.0.into(), 4.0.into()],
            vec!["Widget".into(), 2024.0.into(), 7.0.into()],
        ];
        let series = build_series(&rows, &columns, &settings, &ColorPalette::default());

        let hover = hover_data(&columns, &series, &data, 0, 0).unwrap();
        assert_eq!(hover.rows[1].value, RowValue::from("FY 2023"));
        // clicks keep the raw value for filtering
        let click = click_data(&columns, &series, &data, 0, 0).unwrap();
        assert_eq!(click.dimensions[1].value, Some(RowValue::Number(2023.0)));
    }

    #[test]
    fn test_hover_multiple_metrics() {
        let columns = ChartColumns::MultipleMetrics {
            dimension: descriptor(0, "category", "Category", "type/Text"),
            metrics: vec![
                descriptor(1, "count", "Count", "type/Integer"),
                descriptor(2, "avg", "Average", "type/Float"),
            ],
        };
        let rows = vec![vec!["Gizmo".into(), 3.0.into(), RowValue::Null]];
        let series = build_series(
            &rows,
            &columns,
            &VisualizationSettings::default(),
            &ColorPalette::default(),
        );
        let data = group_dataset(&rows, &columns);

        let hover = hover_data(&columns, &series, &data, 1, 0).unwrap();
        assert_eq!(hover.rows.len(), 2);
        assert_eq!(hover.rows[1].key, "Average");
        assert_eq!(hover.rows[1].value, RowValue::Null);

        let click = click_data(&columns, &series, &data, 0, 0).unwrap();
        assert_eq!(click.dimensions.len(), 1);
        assert_eq!(click.value, Some(3.0));
    }

    #[test]
    fn test_out_of_range() {
        let (columns, series, data) = breakout_fixture();
        assert!(click_data(&columns, &series, &data, 5, 0).is_none());
        assert!(hover_data(&columns, &series, &data, 0, 9).is_none());
    }
}
