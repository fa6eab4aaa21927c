use log::debug;
use serde::Serialize;
use std::collections::HashSet;

use crate::settings::ScaleType;

/// Fractional gap between category bands, applied inside and at both ends.
pub const CATEGORY_PADDING: f64 = 0.2;
/// Exponent of the power value scale.
pub const POW_EXPONENT: f64 = 2.0;
/// Tick count used by non-linear value scales.
pub const NON_LINEAR_TICK_COUNT: usize = 4;
/// Lower bound for linear tick counts.
pub const MIN_TICK_COUNT: usize = 2;
/// Tick count used when rounding a linear domain.
pub const NICE_TICK_COUNT: usize = 10;

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

// =============================================================================
// Category axis
// =============================================================================

/// Discrete band scale mapping category labels onto evenly spaced bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandScale {
    pub domain: Vec<String>,
    pub range: (f64, f64),
    pub padding: f64,
    pub step: f64,
    pub bandwidth: f64,
    start: f64,
}

impl BandScale {
    pub fn new(labels: impl IntoIterator<Item = String>, range: (f64, f64), padding: f64) -> Self {
        let mut seen = HashSet::new();
        let domain: Vec<String> = labels
            .into_iter()
            .filter(|label| seen.insert(label.clone()))
            .collect();

        let n = domain.len() as f64;
        let (r0, r1) = range;
        let (lo, hi) = if r1 < r0 { (r1, r0) } else { (r0, r1) };

        // inner padding == outer padding, centered
        let step = (hi - lo) / (n - padding + padding * 2.0).max(1.0);
        let start = lo + (hi - lo - step * (n - padding)) * 0.5;
        let bandwidth = step * (1.0 - padding);

        Self {
            domain,
            range,
            padding,
            step,
            bandwidth,
            start,
        }
    }

    /// Start coordinate of the band holding `label`
    pub fn position(&self, label: &str) -> Option<f64> {
        self.domain
            .iter()
            .position(|d| d == label)
            .map(|i| self.start + self.step * i as f64)
    }
}

/// Split one band evenly between `count` side-by-side series.
pub fn inner_band_offsets(bandwidth: f64, count: usize) -> (f64, Vec<f64>) {
    if count == 0 {
        return (bandwidth, Vec::new());
    }
    let step = bandwidth / count as f64;
    (step, (0..count).map(|i| step * i as f64).collect())
}

// =============================================================================
// Value axis
// =============================================================================

/// Continuous scale with a linear, square or log10 transform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinuousScale {
    pub kind: ScaleType,
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl ContinuousScale {
    pub fn new(kind: ScaleType, domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { kind, domain, range }
    }

    fn transform(&self, value: f64) -> f64 {
        match self.kind {
            ScaleType::Linear => value,
            ScaleType::Pow => value.signum() * value.abs().powf(POW_EXPONENT),
            ScaleType::Log => value.log10(),
        }
    }

    /// Map a domain value to a pixel coordinate.
    ///
    /// Non-positive values on a log scale map to the start of the range.
    pub fn apply(&self, value: f64) -> f64 {
        if self.kind == ScaleType::Log && value <= 0.0 {
            return self.range.0;
        }
        let d0 = self.transform(self.domain.0);
        let d1 = self.transform(self.domain.1);
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (self.transform(value) - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Extend a linear domain outward to round tick boundaries
    pub fn nice(mut self, count: usize) -> Self {
        if self.kind != ScaleType::Linear {
            return self;
        }
        let (mut start, mut stop) = self.domain;
        let reversed = stop < start;
        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }

        let mut prestep: Option<f64> = None;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count as f64);
            if prestep == Some(step) {
                break;
            } else if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            prestep = Some(step);
        }

        self.domain = if reversed { (stop, start) } else { (start, stop) };
        self
    }

    /// Tick values inside the domain
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };
        match self.kind {
            ScaleType::Linear | ScaleType::Pow => linear_ticks(lo, hi, count),
            ScaleType::Log => log_ticks(lo, hi, count),
        }
    }
}

fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let (i1, i2, inc) = if power < 0.0 {
        let positive_inc = 10f64.powf(-power) / factor;
        let mut i1 = (start * positive_inc).round();
        let mut i2 = (stop * positive_inc).round();
        if i1 / positive_inc < start {
            i1 += 1.0;
        }
        if i2 / positive_inc > stop {
            i2 -= 1.0;
        }
        (i1, i2, -positive_inc)
    } else {
        let inc = 10f64.powf(power) * factor;
        let mut i1 = (start / inc).round();
        let mut i2 = (stop / inc).round();
        if i1 * inc < start {
            i1 += 1.0;
        }
        if i2 * inc > stop {
            i2 -= 1.0;
        }
        (i1, i2, inc)
    };

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

/// Signed tick step: positive steps are multiplied, negative ones divided.
fn tick_increment(start: f64, stop: f64, count: f64) -> f64 {
    let (_, _, inc) = tick_spec(start, stop, count);
    if inc.is_finite() {
        inc
    } else {
        0.0
    }
}

/// Round-number ticks between `start` and `stop` (inclusive)
pub fn linear_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let (i1, i2, inc) = tick_spec(start, stop, count as f64);
    if i2 < i1 || i1.is_nan() || i2.is_nan() || !inc.is_finite() {
        return Vec::new();
    }
    let n = (i2 - i1) as usize + 1;
    (0..n)
        .map(|i| {
            let k = i1 + i as f64;
            if inc < 0.0 {
                k / -inc
            } else {
                k * inc
            }
        })
        .collect()
}

/// Powers of ten inside the domain, thinned to roughly `count` entries
pub fn log_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || start <= 0.0 || stop <= 0.0 {
        return Vec::new();
    }
    let first = start.log10().ceil() as i32;
    let last = stop.log10().floor() as i32;
    if last < first {
        return linear_ticks(start, stop, count);
    }

    let powers: Vec<f64> = (first..=last).map(|p| 10f64.powi(p)).collect();
    let stride = powers.len().div_ceil(count).max(1);
    powers.into_iter().step_by(stride).collect()
}

/// Domain covering every value; log domains only consider strictly positive values.
pub fn continuous_domain(values: impl IntoIterator<Item = f64>, kind: ScaleType) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.into_iter().filter(|v| v.is_finite()) {
        if kind == ScaleType::Log && v <= 0.0 {
            continue;
        }
        min = min.min(v);
        max = max.max(v);
    }

    let domain = match kind {
        ScaleType::Log => {
            if !min.is_finite() {
                (1.0, 10.0)
            } else if min == max {
                (decade_below(min), max * 10.0)
            } else {
                (decade_below(min), max)
            }
        }
        _ => {
            if !min.is_finite() || (min == 0.0 && max == 0.0) {
                (0.0, 1.0)
            } else if min == max {
                (min - 1.0, max + 1.0)
            } else {
                (min, max)
            }
        }
    };
    debug!("Value domain ({:?}): {:?}", kind, domain);
    domain
}

/// Largest power of ten strictly below `value`, so the smallest bar keeps some length
fn decade_below(value: f64) -> f64 {
    let lower = 10f64.powi(value.log10().ceil() as i32 - 1);
    if lower < value {
        lower
    } else {
        lower / 10.0
    }
}

/// Number of value-axis ticks that fit in `inner_width`
pub fn x_tick_count(inner_width: f64, kind: ScaleType, min_tick_interval: f64) -> usize {
    if kind != ScaleType::Linear {
        return NON_LINEAR_TICK_COUNT;
    }
    let fitted = (inner_width / min_tick_interval).floor();
    if fitted.is_finite() && fitted > MIN_TICK_COUNT as f64 {
        fitted as usize
    } else {
        MIN_TICK_COUNT
    }
}
