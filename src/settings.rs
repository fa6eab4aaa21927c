use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{ChartError, ChartResult};
use crate::ir::ChartGoal;
use crate::stack::StackOffset;

pub const DEFAULT_GOAL_LABEL: &str = "Goal";

/// How series are stacked on the value axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackType {
    Stacked,
    Normalized,
}

impl FromStr for StackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stacked" | "stack" => Ok(StackType::Stacked),
            "normalized" | "normalize" | "percent" => Ok(StackType::Normalized),
            other => Err(format!("unknown stack type '{}'", other)),
        }
    }
}

/// Transform applied by the value axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    #[default]
    Linear,
    Pow,
    Log,
}

impl FromStr for ScaleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(ScaleType::Linear),
            "pow" | "power" => Ok(ScaleType::Pow),
            "log" | "log10" => Ok(ScaleType::Log),
            other => Err(format!("unknown scale type '{}'", other)),
        }
    }
}

/// One entry of the user-configured series ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesOrderSetting {
    #[serde(default)]
    pub key: Option<String>,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub color: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// Per-series overrides keyed by series key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesSettings {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Flat visualization configuration, using the product's setting keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualizationSettings {
    #[serde(rename = "graph.dimensions", default)]
    pub dimensions: Vec<String>,
    #[serde(rename = "graph.metrics", default)]
    pub metrics: Vec<String>,
    #[serde(rename = "graph.max_categories", default)]
    pub max_categories: Option<usize>,
    #[serde(rename = "stackable.stack_type", default)]
    pub stack_type: Option<StackType>,
    #[serde(rename = "graph.x_axis.scale", default)]
    pub x_axis_scale: ScaleType,
    #[serde(rename = "graph.show_goal", default)]
    pub show_goal: bool,
    #[serde(rename = "graph.goal_value", default)]
    pub goal_value: Option<f64>,
    #[serde(rename = "graph.goal_label", default)]
    pub goal_label: Option<String>,
    #[serde(rename = "graph.show_values", default)]
    pub show_values: bool,
    #[serde(rename = "graph.series_order", default)]
    pub series_order: Option<Vec<SeriesOrderSetting>>,
    #[serde(default)]
    pub series_settings: BTreeMap<String, SeriesSettings>,
}

impl VisualizationSettings {
    pub fn from_json_str(input: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> ChartResult<()> {
        if self.max_categories == Some(0) {
            return Err(ChartError::incomplete("graph.max_categories must be at least 1"));
        }
        Ok(())
    }

    pub fn stacking_offset(&self) -> Option<StackOffset> {
        self.stack_type.map(|t| match t {
            StackType::Stacked => StackOffset::None,
            StackType::Normalized => StackOffset::Expand,
        })
    }

    pub fn is_normalized(&self) -> bool {
        self.stacking_offset() == Some(StackOffset::Expand)
    }

    /// Goal line descriptor; percentages are rescaled to the 0..1 normalized axis
    pub fn chart_goal(&self) -> Option<ChartGoal> {
        if !self.show_goal {
            return None;
        }
        let value = self.goal_value.unwrap_or(0.0);
        Some(ChartGoal {
            value: if self.is_normalized() { value / 100.0 } else { value },
            label: self
                .goal_label
                .clone()
                .unwrap_or_else(|| DEFAULT_GOAL_LABEL.to_string()),
        })
    }

    pub fn should_show_labels(&self) -> bool {
        self.show_values && !self.is_normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_product_keys() {
        let settings = VisualizationSettings::from_json_str(
            r#"{
                "graph.dimensions": ["category", "vendor"],
                "graph.metrics": ["count"],
                "stackable.stack_type": "normalized",
                "graph.x_axis.scale": "log",
                "graph.show_goal": true,
                "graph.goal_value": 50,
                "unrelated.key": 1
            }"#,
        )
        .unwrap();
        assert_eq!(settings.dimensions, vec!["category", "vendor"]);
        assert_eq!(settings.stack_type, Some(StackType::Normalized));
        assert_eq!(settings.x_axis_scale, ScaleType::Log);
        assert_eq!(settings.stacking_offset(), Some(StackOffset::Expand));
    }

    #[test]
    fn test_defaults() {
        let settings = VisualizationSettings::from_json_str("{}").unwrap();
        assert_eq!(settings.x_axis_scale, ScaleType::Linear);
        assert_eq!(settings.stacking_offset(), None);
        assert!(settings.chart_goal().is_none());
    }

    #[test]
    fn test_goal_percent_in_normalized_mode() {
        let settings = VisualizationSettings {
            show_goal: true,
            goal_value: Some(50.0),
            stack_type: Some(StackType::Normalized),
            ..Default::default()
        };
        let goal = settings.chart_goal().unwrap();
        assert_eq!(goal.value, 0.5);
        assert_eq!(goal.label, "Goal");
    }

    #[test]
    fn test_labels_hidden_when_normalized() {
        let mut settings = VisualizationSettings {
            show_values: true,
            ..Default::default()
        };
        assert!(settings.should_show_labels());
        settings.stack_type = Some(StackType::Normalized);
        assert!(!settings.should_show_labels());
    }

    #[test]
    fn test_series_order_enabled_by_default() {
        let settings = VisualizationSettings::from_json_str(
            r#"{"graph.series_order": [
                {"name": "b", "enabled": true},
                {"name": "a", "enabled": false},
                {"name": "c"}
            ]}"#,
        )
        .unwrap();
        let order = settings.series_order.unwrap();
        let enabled: Vec<bool> = order.iter().map(|s| s.enabled).collect();
        assert_eq!(enabled, vec![true, false, true]);
    }

    #[test]
    fn test_zero_category_limit_rejected() {
        let settings = VisualizationSettings {
            max_categories: Some(0),
            ..Default::default()
        };
        assert!(settings.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("pow".parse::<ScaleType>(), Ok(ScaleType::Pow));
        assert_eq!("stacked".parse::<StackType>(), Ok(StackType::Stacked));
        assert!("sideways".parse::<ScaleType>().is_err());
    }
}
