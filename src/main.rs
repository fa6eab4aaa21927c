use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::warn;
use rowchart::data::is_sensible;
use rowchart::settings::{ScaleType, StackType};
use rowchart::{
    build_row_chart, csv_reader, ChartError, HeuristicTextMeasurer, RenderOptions, TabularResult,
    VisualizationSettings,
};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StackArg {
    None,
    Stacked,
    Normalized,
}

#[derive(Parser, Debug)]
#[command(name = "rowchart", version)]
#[command(about = "Lay out a row chart from a query result read on stdin", long_about = None)]
struct Args {
    /// Read a JSON result (array of objects or {"cols", "rows"}) instead of CSV
    #[arg(long)]
    json: bool,
    /// Visualization settings file (JSON, product key names)
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Category axis column
    #[arg(long)]
    dimension: Option<String>,
    /// Column whose values split the metric into series
    #[arg(long)]
    breakout: Option<String>,
    /// Metric column (repeatable)
    #[arg(long = "metric")]
    metrics: Vec<String>,
    #[arg(long, value_enum)]
    stack: Option<StackArg>,
    /// Value axis scale: linear, pow or log
    #[arg(long)]
    scale: Option<ScaleType>,
    /// Draw a goal line at this value
    #[arg(long)]
    goal: Option<f64>,
    #[arg(long)]
    goal_label: Option<String>,
    #[arg(long)]
    max_categories: Option<usize>,
    /// Print bar value labels
    #[arg(long)]
    show_values: bool,
    #[arg(long, default_value_t = 620)]
    width: u32,
    #[arg(long, default_value_t = 440)]
    height: u32,
    /// Print click data for SERIES:DATUM instead of the layout
    #[arg(long, value_parser = parse_bar, conflicts_with = "hover")]
    click: Option<(usize, usize)>,
    /// Print hover data for SERIES:DATUM instead of the layout
    #[arg(long, value_parser = parse_bar)]
    hover: Option<(usize, usize)>,
}

fn parse_bar(s: &str) -> std::result::Result<(usize, usize), String> {
    let (series, datum) = s
        .split_once(':')
        .ok_or_else(|| format!("expected SERIES:DATUM, got '{}'", s))?;
    let series = series
        .trim()
        .parse()
        .map_err(|_| format!("invalid series index '{}'", series))?;
    let datum = datum
        .trim()
        .parse()
        .map_err(|_| format!("invalid datum index '{}'", datum))?;
    Ok((series, datum))
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(err) = run(args) {
        match err.downcast_ref::<ChartError>() {
            Some(chart_err) => {
                eprintln!("Cannot render: {}", chart_err);
                std::process::exit(2);
            }
            None => {
                eprintln!("Error: {:#}", err);
                std::process::exit(1);
            }
        }
    }
}

fn run(args: Args) -> Result<()> {
    let settings = load_settings(&args)?;
    let result = read_result(args.json)?;
    if !is_sensible(&result) {
        warn!("Result has too few rows or lacks a dimension/metric column for a row chart");
    }
    let options = RenderOptions {
        width: args.width,
        height: args.height,
    };

    let layout = build_row_chart(&result, &settings, &options, &HeuristicTextMeasurer::default())?;

    if let Some((series, datum)) = args.click {
        let click = layout
            .click_data(series, datum)
            .with_context(|| format!("No bar at {}:{}", series, datum))?;
        return print_json(&click);
    }
    if let Some((series, datum)) = args.hover {
        let hover = layout
            .hover_data(series, datum)
            .with_context(|| format!("No bar at {}:{}", series, datum))?;
        return print_json(&hover);
    }
    print_json(&layout)
}

/// Settings file first, then command-line overrides
fn load_settings(args: &Args) -> Result<VisualizationSettings> {
    let mut settings = match &args.settings {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file {}", path.display()))?;
            VisualizationSettings::from_json_str(&text)
                .with_context(|| format!("Failed to parse settings file {}", path.display()))?
        }
        None => VisualizationSettings::default(),
    };

    if let Some(dimension) = &args.dimension {
        settings.dimensions = vec![dimension.clone()];
    }
    if let Some(breakout) = &args.breakout {
        settings.dimensions.truncate(1);
        settings.dimensions.push(breakout.clone());
    }
    if !args.metrics.is_empty() {
        settings.metrics = args.metrics.clone();
    }
    if let Some(stack) = args.stack {
        settings.stack_type = match stack {
            StackArg::None => None,
            StackArg::Stacked => Some(StackType::Stacked),
            StackArg::Normalized => Some(StackType::Normalized),
        };
    }
    if let Some(scale) = args.scale {
        settings.x_axis_scale = scale;
    }
    if let Some(goal) = args.goal {
        settings.show_goal = true;
        settings.goal_value = Some(goal);
    }
    if let Some(label) = &args.goal_label {
        settings.goal_label = Some(label.clone());
    }
    if args.max_categories.is_some() {
        settings.max_categories = args.max_categories;
    }
    if args.show_values {
        settings.show_values = true;
    }

    Ok(settings)
}

fn read_result(json: bool) -> Result<TabularResult> {
    if json {
        let value: Value = serde_json::from_reader(io::stdin().lock())
            .context("Failed to parse JSON from stdin")?;
        match value {
            Value::Array(_) => TabularResult::from_json(&value),
            other => TabularResult::from_json_dataset(other),
        }
    } else {
        let csv_data = csv_reader::read_csv_from_stdin().context("Failed to read CSV from stdin")?;
        TabularResult::from_csv(csv_data)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value).context("Failed to serialize output")?;
    writeln!(handle).context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
