// Series color palettes

/// Ordered list of colors handed out to series by index.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    colors: Vec<String>,
}

impl ColorPalette {
    pub fn new(colors: Vec<String>) -> Self {
        Self { colors }
    }

    /// The product's accent colors, in assignment order
    pub fn accent() -> Self {
        Self::from_hex(&[
            "#509EE3", "#88BF4D", "#A989C5", "#EF8C8C", "#F9D45C", "#F2A86F", "#98D9D9", "#7172AD",
        ])
    }

    fn from_hex(colors: &[&str]) -> Self {
        Self::new(colors.iter().map(|c| c.to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for the n-th series, cycling when there are more series than colors
    pub fn color_for(&self, index: usize) -> &str {
        if self.colors.is_empty() {
            return "#000000";
        }
        &self.colors[index % self.colors.len()]
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::accent()
    }
}
