use thiserror::Error;

/// Reasons the pipeline refuses to produce a chart.
///
/// None of these are crashes: callers map them onto a "pick fields" prompt or an
/// empty-state placeholder instead of rendering a partial chart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("chart configuration incomplete: {missing}")]
    ConfigurationIncomplete { missing: String },

    #[error("not enough data to render: {reason}")]
    InsufficientData { reason: String },
}

impl ChartError {
    pub fn incomplete(missing: impl Into<String>) -> Self {
        ChartError::ConfigurationIncomplete { missing: missing.into() }
    }

    pub fn insufficient(reason: impl Into<String>) -> Self {
        ChartError::InsufficientData { reason: reason.into() }
    }

    /// True for the "choose fields" family of errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ChartError::ConfigurationIncomplete { .. })
    }
}

pub type ChartResult<T> = std::result::Result<T, ChartError>;
