use num_format::{Locale, ToFormattedString};

use crate::data::RowValue;

const MAX_DECIMALS: usize = 2;
const PERCENT_DECIMALS: usize = 2;

/// Value -> display string conversions for both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickFormatters {
    /// Value ticks are fractions of the category total.
    pub percent: bool,
}

impl TickFormatters {
    pub fn new(percent: bool) -> Self {
        Self { percent }
    }

    /// Category axis label
    pub fn format_dimension(&self, value: &RowValue) -> String {
        value.to_string()
    }

    /// Value axis tick label
    pub fn format_metric(&self, value: f64) -> String {
        if self.percent {
            format_percent(value)
        } else {
            format_number(value)
        }
    }
}

/// Thousands-separated number with at most two decimals
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let scale = 10f64.powi(MAX_DECIMALS as i32);
    let rounded = (value * scale).round() / scale;
    let negative = rounded < 0.0;
    let abs = rounded.abs();

    let integer = abs.trunc() as i64;
    let fraction = format!("{:.*}", MAX_DECIMALS, abs.fract());
    // "0.50" -> "5", "0.00" -> ""
    let fraction = fraction
        .trim_start_matches('0')
        .trim_start_matches('.')
        .trim_end_matches('0');

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&integer.to_formatted_string(&Locale::en));
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

pub fn format_percent(value: f64) -> String {
    format!("{:.*}%", PERCENT_DECIMALS, value * 100.0)
}
