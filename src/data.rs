use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::csv_reader::CsvData;

const NUMERIC_BASE_TYPES: &[&str] = &[
    "type/Integer",
    "type/BigInteger",
    "type/Float",
    "type/Decimal",
    "type/Number",
];

/// A single cell of a query result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl RowValue {
    /// Numeric contribution of this cell; anything that is not a number counts as missing.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RowValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RowValue::Null)
    }
}

static NULL_CELL: RowValue = RowValue::Null;

/// Cell at `index`, or null when the row is too short
pub fn cell(row: &[RowValue], index: usize) -> &RowValue {
    row.get(index).unwrap_or(&NULL_CELL)
}

impl PartialEq for RowValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RowValue::Null, RowValue::Null) => true,
            (RowValue::Bool(a), RowValue::Bool(b)) => a == b,
            (RowValue::Number(a), RowValue::Number(b)) => number_bits(*a) == number_bits(*b),
            (RowValue::Text(a), RowValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for RowValue {}

impl Hash for RowValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            RowValue::Null => {}
            RowValue::Bool(b) => b.hash(state),
            RowValue::Number(n) => number_bits(*n).hash(state),
            RowValue::Text(s) => s.hash(state),
        }
    }
}

// -0 and 0 share a key, every NaN shares a key
fn number_bits(n: f64) -> u64 {
    if n == 0.0 {
        0.0f64.to_bits()
    } else if n.is_nan() {
        f64::NAN.to_bits()
    } else {
        n.to_bits()
    }
}

impl fmt::Display for RowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowValue::Null => f.write_str("null"),
            RowValue::Bool(b) => write!(f, "{}", b),
            RowValue::Number(n) if *n == 0.0 => f.write_str("0"),
            RowValue::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            RowValue::Number(n) => write!(f, "{}", n),
            RowValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for RowValue {
    fn from(n: f64) -> Self {
        RowValue::Number(n)
    }
}

impl From<i64> for RowValue {
    fn from(n: i64) -> Self {
        RowValue::Number(n as f64)
    }
}

impl From<&str> for RowValue {
    fn from(s: &str) -> Self {
        RowValue::Text(s.to_string())
    }
}

impl From<String> for RowValue {
    fn from(s: String) -> Self {
        RowValue::Text(s)
    }
}

impl From<bool> for RowValue {
    fn from(b: bool) -> Self {
        RowValue::Bool(b)
    }
}

/// Column metadata as returned alongside a result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetColumn {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub base_type: Option<String>,
    #[serde(default)]
    pub semantic_type: Option<String>,
}

impl DatasetColumn {
    pub fn new(name: &str, base_type: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: name.to_string(),
            base_type: Some(base_type.to_string()),
            semantic_type: None,
        }
    }

    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = display_name.to_string();
        self
    }

    pub fn is_numeric(&self) -> bool {
        self.base_type
            .as_deref()
            .map(|t| NUMERIC_BASE_TYPES.contains(&t))
            .unwrap_or(false)
    }

    fn is_key(&self) -> bool {
        matches!(self.semantic_type.as_deref(), Some("type/PK") | Some("type/FK"))
    }

    pub fn is_metric(&self) -> bool {
        self.is_numeric() && !self.is_key()
    }

    pub fn is_dimension(&self) -> bool {
        !self.is_metric() || self.is_key() || self.semantic_type.as_deref() == Some("type/Category")
    }
}

/// An immutable, column-aligned query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularResult {
    pub cols: Vec<DatasetColumn>,
    pub rows: Vec<Vec<RowValue>>,
}

impl TabularResult {
    pub fn new(cols: Vec<DatasetColumn>, rows: Vec<Vec<RowValue>>) -> Result<Self> {
        let result = Self { cols, rows };
        result.validate()?;
        Ok(result)
    }

    fn validate(&self) -> Result<()> {
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.cols.len() {
                bail!(
                    "Row {} has {} values but the result has {} columns",
                    i,
                    row.len(),
                    self.cols.len()
                );
            }
        }
        Ok(())
    }

    /// Build a result from CSV text, inferring numeric columns
    pub fn from_csv(csv: CsvData) -> Result<Self> {
        let rows: Vec<Vec<RowValue>> = csv
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| parse_cell(cell)).collect())
            .collect();

        if let Some(i) = rows.iter().position(|r| r.len() != csv.headers.len()) {
            bail!("CSV row {} does not match the header width", i + 1);
        }
        let cols = infer_columns(&csv.headers, &rows);
        Self::new(cols, rows)
    }

    /// Create a result from a JSON Array of Objects
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        if array.is_empty() {
            return Err(anyhow!("Input data array is empty"));
        }

        // Extract headers from the first object
        let first_obj = array[0]
            .as_object()
            .ok_or_else(|| anyhow!("Items in array must be objects"))?;
        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut rows = Vec::new();
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;

            let mut row = Vec::new();
            for header in &headers {
                let value = match obj.get(header) {
                    Some(Value::String(s)) => RowValue::Text(s.clone()),
                    Some(Value::Number(n)) => n
                        .as_f64()
                        .map(RowValue::Number)
                        .ok_or_else(|| anyhow!("Number out of range for field '{}'", header))?,
                    Some(Value::Bool(b)) => RowValue::Bool(*b),
                    Some(Value::Null) | None => RowValue::Null,
                    _ => return Err(anyhow!("Unsupported value type for field '{}'", header)),
                };
                row.push(value);
            }
            rows.push(row);
        }

        let cols = infer_columns(&headers, &rows);
        Self::new(cols, rows)
    }

    /// Parse the API shape `{"cols": [...], "rows": [[...], ...]}`
    pub fn from_json_dataset(value: Value) -> Result<Self> {
        let mut result: TabularResult = serde_json::from_value(value)?;
        for col in &mut result.cols {
            if col.display_name.is_empty() {
                col.display_name = col.name.clone();
            }
        }
        result.validate()?;
        Ok(result)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.cols.iter().position(|c| c.name == name)
    }
}

/// A column is numeric when it has at least one value and every non-null value is a number.
fn infer_columns(headers: &[String], rows: &[Vec<RowValue>]) -> Vec<DatasetColumn> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let mut cells = rows.iter().map(|r| &r[idx]).filter(|v| !v.is_null()).peekable();
            let numeric = cells.peek().is_some() && cells.all(|v| v.as_number().is_some());
            DatasetColumn::new(header, if numeric { "type/Float" } else { "type/Text" })
        })
        .collect()
}

fn parse_cell(cell: &str) -> RowValue {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        RowValue::Null
    } else {
        match trimmed.parse::<f64>() {
            // "NaN" and "inf" parse as floats but are text labels here
            Ok(n) if n.is_finite() => RowValue::Number(n),
            _ => RowValue::Text(cell.to_string()),
        }
    }
}

/// Whether a row chart makes sense for this result at all
pub fn is_sensible(result: &TabularResult) -> bool {
    result.rows.len() > 1
        && result.cols.len() >= 2
        && result.cols.iter().any(DatasetColumn::is_dimension)
        && result.cols.iter().any(DatasetColumn::is_metric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_row_value_keys() {
        let mut keys = HashSet::new();
        keys.insert(RowValue::Number(0.0));
        keys.insert(RowValue::Number(-0.0));
        keys.insert(RowValue::Text("0".to_string()));
        keys.insert(RowValue::Null);
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_row_value_display() {
        assert_eq!(RowValue::Number(3.0).to_string(), "3");
        assert_eq!(RowValue::Number(2.5).to_string(), "2.5");
        assert_eq!(RowValue::Number(-0.0).to_string(), "0");
        assert_eq!(RowValue::Null.to_string(), "null");
        assert_eq!(RowValue::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_from_csv_infers_types() {
        let csv = CsvData {
            headers: vec!["region".to_string(), "sales".to_string()],
            rows: vec![
                vec!["North".to_string(), "10".to_string()],
                vec!["South".to_string(), "".to_string()],
            ],
        };
        let result = TabularResult::from_csv(csv).unwrap();
        assert!(!result.cols[0].is_metric());
        assert!(result.cols[1].is_metric());
        assert_eq!(result.rows[0][1], RowValue::Number(10.0));
        assert!(result.rows[1][1].is_null());
    }

    #[test]
    fn test_from_csv_keeps_non_finite_words_as_text() {
        let csv = CsvData {
            headers: vec!["name".to_string(), "total".to_string()],
            rows: vec![
                vec!["Nan".to_string(), "5".to_string()],
                vec!["Inf".to_string(), "Infinity".to_string()],
                vec!["Bob".to_string(), "NaN".to_string()],
                vec!["Bob".to_string(), "-inf".to_string()],
            ],
        };
        let result = TabularResult::from_csv(csv).unwrap();
        assert_eq!(result.rows[0][0], RowValue::from("Nan"));
        assert_eq!(result.rows[1][0], RowValue::from("Inf"));
        assert_eq!(result.rows[1][1], RowValue::from("Infinity"));
        assert_eq!(result.rows[2][1], RowValue::from("NaN"));
        assert_eq!(result.rows[3][1], RowValue::from("-inf"));
        assert_eq!(result.rows[0][1], RowValue::Number(5.0));
        assert_eq!(result.rows[0][0].to_string(), "Nan");
    }

    #[test]
    fn test_from_json() {
        let value = json!([
            {"category": "A", "count": 1},
            {"category": "B", "count": null}
        ]);
        let result = TabularResult::from_json(&value).unwrap();
        assert_eq!(result.rows.len(), 2);
        let idx = result.column_index("count").unwrap();
        assert_eq!(result.rows[0][idx], RowValue::Number(1.0));
        assert!(result.rows[1][idx].is_null());
    }

    #[test]
    fn test_from_json_empty() {
        assert!(TabularResult::from_json(&json!([])).is_err());
    }

    #[test]
    fn test_from_json_dataset() {
        let value = json!({
            "cols": [
                {"name": "CATEGORY", "base_type": "type/Text"},
                {"name": "count", "display_name": "Count", "base_type": "type/Integer"}
            ],
            "rows": [["Widget", 3], ["Gadget", 4]]
        });
        let result = TabularResult::from_json_dataset(value).unwrap();
        assert_eq!(result.cols[0].display_name, "CATEGORY");
        assert_eq!(result.cols[1].display_name, "Count");
        assert_eq!(result.rows[1][0], RowValue::from("Gadget"));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let cols = vec![DatasetColumn::new("a", "type/Text")];
        let rows = vec![vec![RowValue::from("x"), RowValue::from(1.0)]];
        assert!(TabularResult::new(cols, rows).is_err());
    }

    #[test]
    fn test_is_sensible() {
        let cols = vec![
            DatasetColumn::new("category", "type/Text"),
            DatasetColumn::new("count", "type/Integer"),
        ];
        let one_row = TabularResult::new(cols.clone(), vec![vec!["A".into(), 1.0.into()]]).unwrap();
        assert!(!is_sensible(&one_row));

        let two_rows = TabularResult::new(
            cols,
            vec![vec!["A".into(), 1.0.into()], vec!["B".into(), 2.0.into()]],
        )
        .unwrap();
        assert!(is_sensible(&two_rows));
    }
}
