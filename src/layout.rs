//! Layout Composition
//!
//! Runs every pipeline stage for one render and derives the geometry a drawing
//! layer needs: margins, scales, ticks, goal line and bar rectangles.

use log::debug;
use std::num::NonZeroUsize;

use crate::data::TabularResult;
use crate::error::{ChartError, ChartResult};
use crate::format::{format_number, TickFormatters};
use crate::ir::{BarGeometry, ChartGoal, GoalLine, GroupedDatum, Margin, RowChartLayout, Series, Tick};
use crate::measure::{max_text_width, TextMeasurer};
use crate::palette::ColorPalette;
use crate::resolve::resolve_chart_columns;
use crate::scale::{
    continuous_domain, inner_band_offsets, x_tick_count, BandScale, ContinuousScale,
    CATEGORY_PADDING, NICE_TICK_COUNT,
};
use crate::series::build_series;
use crate::settings::{ScaleType, VisualizationSettings};
use crate::stack::{stack_series, stacked_values, StackedSeries};
use crate::theme::ChartTheme;
use crate::transform::{group_dataset, max_category_count, trim_dataset, MIN_BAR_HEIGHT};
use crate::RenderOptions;

pub const CHART_PADDING: f64 = 10.0;
pub const TICKS_OFFSET: f64 = 10.0;
pub const GOAL_LINE_PADDING: f64 = 14.0;

/// Space around the plotting area.
///
/// The left side fits the widest category label, the top leaves room for a goal
/// label and the bottom fits one line of value-axis ticks.
pub fn chart_margin<M: TextMeasurer + ?Sized>(
    category_labels: &[String],
    has_goal: bool,
    theme: &ChartTheme,
    measurer: &M,
) -> Margin {
    let label_width = max_text_width(category_labels, &theme.axis_ticks.font, measurer);
    Margin {
        top: CHART_PADDING + if has_goal { GOAL_LINE_PADDING } else { 0.0 },
        bottom: CHART_PADDING + TICKS_OFFSET + theme.axis_ticks.font.size,
        left: label_width + TICKS_OFFSET + CHART_PADDING,
        right: CHART_PADDING,
    }
}

/// Build a row chart layout with the default theme and palette
pub fn build_row_chart<M: TextMeasurer + ?Sized>(
    result: &TabularResult,
    settings: &VisualizationSettings,
    options: &RenderOptions,
    measurer: &M,
) -> ChartResult<RowChartLayout> {
    build_row_chart_with(
        result,
        settings,
        options,
        measurer,
        &ChartTheme::default(),
        &ColorPalette::default(),
    )
}

pub fn build_row_chart_with<M: TextMeasurer + ?Sized>(
    result: &TabularResult,
    settings: &VisualizationSettings,
    options: &RenderOptions,
    measurer: &M,
    theme: &ChartTheme,
    palette: &ColorPalette,
) -> ChartResult<RowChartLayout> {
    settings.validate()?;

    // Phase 1: Resolution
    let chart_columns = resolve_chart_columns(result, settings)?;
    if result.rows.is_empty() {
        return Err(ChartError::insufficient("the result has no rows"));
    }

    // Phase 2: Grouping
    let grouped_data = group_dataset(&result.rows, &chart_columns);

    // Phase 3: Series
    let series = build_series(&result.rows, &chart_columns, settings, palette);
    if series.is_empty() {
        return Err(ChartError::insufficient("no series left to plot"));
    }

    let width = options.width as f64;
    let height = options.height as f64;
    let offset = settings.stacking_offset();

    let limit = match settings.max_categories {
        Some(n) => NonZeroUsize::new(n)
            .ok_or_else(|| ChartError::incomplete("graph.max_categories must be at least 1"))?,
        None => max_category_count(height, MIN_BAR_HEIGHT, offset.is_some(), series.len()),
    };
    let trimmed_data = trim_dataset(&grouped_data, limit);
    debug!(
        "{} categories grouped, {} kept (limit {})",
        grouped_data.len(),
        trimmed_data.len(),
        limit
    );

    let stacked = offset.map(|offset| stack_series(&trimmed_data, &series, offset));

    // Phase 4: Layout
    let formatters = TickFormatters::new(settings.is_normalized());
    let y_labels: Vec<String> = trimmed_data
        .iter()
        .map(|d| formatters.format_dimension(&d.dimension_value))
        .collect();

    let goal = settings.chart_goal();
    let margin = chart_margin(&y_labels, goal.is_some(), theme, measurer);
    let inner_width = width - margin.left - margin.right;
    let inner_height = height - margin.top - margin.bottom;
    if inner_width <= 0.0 || inner_height <= 0.0 {
        return Err(ChartError::insufficient(format!(
            "no room to draw in {}x{}",
            options.width, options.height
        )));
    }

    let category_scale =
        BandScale::new(y_labels.iter().cloned(), (0.0, inner_height), CATEGORY_PADDING);
    let value_scale = build_value_scale(
        &trimmed_data,
        &series,
        stacked.as_ref(),
        goal.as_ref(),
        settings.x_axis_scale,
        inner_width,
    );

    let tick_count = x_tick_count(inner_width, settings.x_axis_scale, theme.min_ticks_interval);
    let x_ticks = value_scale
        .ticks(tick_count)
        .into_iter()
        .map(|value| Tick {
            value,
            position: value_scale.apply(value),
            label: formatters.format_metric(value),
        })
        .collect();

    let goal = goal.map(|goal| GoalLine {
        x: value_scale.apply(goal.value),
        value: goal.value,
        label: goal.label,
    });

    let show_value_labels = settings.should_show_labels();
    let bars = match &stacked {
        Some(stacked) => stacked_bars(
            &trimmed_data,
            &series,
            stacked,
            &y_labels,
            &category_scale,
            &value_scale,
            show_value_labels,
        ),
        None => grouped_bars(
            &trimmed_data,
            &series,
            &y_labels,
            &category_scale,
            &value_scale,
            show_value_labels,
        ),
    };

    Ok(RowChartLayout {
        width,
        height,
        inner_width,
        inner_height,
        chart_columns,
        grouped_data,
        trimmed_data,
        series,
        stacked,
        category_scale,
        value_scale,
        x_ticks,
        y_labels,
        margin,
        goal,
        show_value_labels,
        bars,
        theme: theme.clone(),
    })
}

/// Value-axis scale over every plotted value and the goal
fn build_value_scale(
    data: &[GroupedDatum],
    series: &[Series],
    stacked: Option<&StackedSeries>,
    goal: Option<&ChartGoal>,
    kind: ScaleType,
    inner_width: f64,
) -> ContinuousScale {
    let mut values: Vec<f64> = match stacked {
        Some(stacked) => stacked_values(stacked).collect(),
        None => series
            .iter()
            .flat_map(|s| data.iter().filter_map(move |d| s.x_value(d)))
            .collect(),
    };
    // bars grow from zero
    values.push(0.0);
    if let Some(goal) = goal {
        values.push(goal.value);
    }

    let domain = continuous_domain(values, kind);
    let scale = ContinuousScale::new(kind, domain, (0.0, inner_width));
    match kind {
        ScaleType::Linear => scale.nice(NICE_TICK_COUNT),
        _ => scale,
    }
}

/// Horizontal extent of a bar spanning `from..to` in domain units
fn bar_extent(scale: &ContinuousScale, from: f64, to: f64) -> (f64, f64) {
    let a = scale.apply(from);
    let b = scale.apply(to);
    (a.min(b), (b - a).abs())
}

fn stacked_bars(
    data: &[GroupedDatum],
    series: &[Series],
    stacked: &StackedSeries,
    y_labels: &[String],
    category_scale: &BandScale,
    value_scale: &ContinuousScale,
    show_labels: bool,
) -> Vec<BarGeometry> {
    let mut bars = Vec::new();
    for (series_index, (s, extents)) in series.iter().zip(stacked).enumerate() {
        for (datum_index, (datum, &(start, end))) in data.iter().zip(extents).enumerate() {
            let Some(value) = s.x_value(datum) else { continue };
            let Some(y) = category_scale.position(&y_labels[datum_index]) else { continue };
            let (x, width) = bar_extent(value_scale, start, end);
            bars.push(BarGeometry {
                series_index,
                datum_index,
                x,
                y,
                width,
                height: category_scale.bandwidth,
                color: s.color.clone(),
                value,
                label: show_labels.then(|| format_number(value)),
            });
        }
    }
    bars
}

fn grouped_bars(
    data: &[GroupedDatum],
    series: &[Series],
    y_labels: &[String],
    category_scale: &BandScale,
    value_scale: &ContinuousScale,
    show_labels: bool,
) -> Vec<BarGeometry> {
    let (inner_bandwidth, offsets) = inner_band_offsets(category_scale.bandwidth, series.len());
    let mut bars = Vec::new();
    for (series_index, (s, offset)) in series.iter().zip(&offsets).enumerate() {
        for (datum_index, datum) in data.iter().enumerate() {
            let Some(value) = s.x_value(datum) else { continue };
            let Some(band) = category_scale.position(&y_labels[datum_index]) else { continue };
            let (x, width) = bar_extent(value_scale, 0.0, value);
            bars.push(BarGeometry {
                series_index,
                datum_index,
                x,
                y: band + offset,
                width,
                height: inner_bandwidth,
                color: s.color.clone(),
                value,
                label: show_labels.then(|| format_number(value)),
            });
        }
    }
    bars
}
