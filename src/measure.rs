use serde::Serialize;

/// Font used for a piece of chart text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontStyle {
    pub size: f64,
    pub family: String,
    pub weight: u16,
}

impl FontStyle {
    pub fn new(size: f64, weight: u16) -> Self {
        Self {
            size,
            family: "Lato".to_string(),
            weight,
        }
    }
}

/// Measures rendered text width in pixels.
///
/// Interactive hosts measure with a real font engine; headless rendering uses
/// [`HeuristicTextMeasurer`].
pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &FontStyle) -> f64;
}

impl<F> TextMeasurer for F
where
    F: Fn(&str, &FontStyle) -> f64,
{
    fn measure(&self, text: &str, style: &FontStyle) -> f64 {
        self(text, style)
    }
}

/// Average-glyph-width approximation, good enough when no font engine is available.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicTextMeasurer {
    pub char_width_ratio: f64,
    pub bold_factor: f64,
}

impl Default for HeuristicTextMeasurer {
    fn default() -> Self {
        Self {
            char_width_ratio: 0.6,
            bold_factor: 1.1,
        }
    }
}

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, style: &FontStyle) -> f64 {
        let chars = text.chars().count() as f64;
        let width = chars * style.size * self.char_width_ratio;
        if style.weight >= 600 {
            width * self.bold_factor
        } else {
            width
        }
    }
}

/// Width of the widest label, 0 when there are none
pub fn max_text_width<M: TextMeasurer + ?Sized>(
    labels: &[String],
    style: &FontStyle,
    measurer: &M,
) -> f64 {
    labels
        .iter()
        .map(|label| measurer.measure(label, style))
        .fold(0.0, f64::max)
}
