//! Dataset - Row-oriented table handed to the analysis core
//!
//! A dataset is a list of records mapping column names to scalar cells. The
//! column set is not known in advance and any record may omit columns. The
//! analysis core only ever reads from it.

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row: column name -> cell
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset with an explicit column order (e.g. a CSV header).
    /// Keys present in records but missing from `columns` are appended.
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        let mut columns = columns;
        for record in &records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, records }
    }

    /// Build a dataset from records alone; columns appear in first-seen order.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self::new(Vec::new(), records)
    }

    /// Build a dataset from JSON values. Non-object values are skipped.
    pub fn from_values(values: Vec<Value>) -> Self {
        let records = values
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(obj) => Some(obj),
                _ => None,
            })
            .collect();
        Self::from_records(records)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        self.records.get(row).and_then(|r| r.get(column))
    }

    /// Numeric view of a column, one entry per row. Cells that cannot be
    /// coerced are `None`.
    pub fn numeric_values(&self, column: &str) -> Vec<Option<f64>> {
        self.records
            .iter()
            .map(|r| r.get(column).and_then(coerce_numeric))
            .collect()
    }

    /// Only the cells of a column that coerce to a number.
    pub fn present_numeric(&self, column: &str) -> Vec<f64> {
        self.numeric_values(column).into_iter().flatten().collect()
    }

    /// A column is numeric when it has at least one value and every
    /// non-missing value is a number.
    pub fn is_numeric_column(&self, column: &str) -> bool {
        let mut seen = false;
        for record in &self.records {
            match record.get(column) {
                None | Some(Value::Null) => {}
                Some(Value::Number(_)) => seen = true,
                Some(_) => return false,
            }
        }
        seen
    }

    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| self.is_numeric_column(c))
            .map(|c| c.as_str())
            .collect()
    }

    /// Build a Float64 frame from `(source column, alias)` pairs, coercing
    /// every cell. Unparseable cells become nulls.
    pub fn numeric_frame(&self, columns: &[(&str, &str)]) -> Result<DataFrame> {
        let series: Vec<Series> = columns
            .iter()
            .map(|&(source, alias)| Series::new(alias, self.numeric_values(source)))
            .collect();
        Ok(DataFrame::new(series)?)
    }
}

/// Coerce a cell to a finite number. Numeric strings are parsed, booleans map
/// to 1/0, everything else is missing.
pub fn coerce_numeric(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }?;
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Dataset {
        Dataset::from_values(vec![
            json!({"Year": 2000, "Value": "10", "Item": "Wheat"}),
            json!({"Year": "n/a", "Value": 20.5}),
            json!({"Year": 2001, "Value": null, "Note": "revised"}),
        ])
    }

    #[test]
    fn test_columns_are_union_of_keys() {
        let ds = sample();
        assert_eq!(ds.row_count(), 3);
        assert!(ds.has_column("Note"));
        assert!(ds.has_column("Item"));
        assert_eq!(ds.column_count(), 4);
    }

    #[test]
    fn test_explicit_column_order_is_kept() {
        let mut rec = Record::new();
        rec.insert("b".to_string(), json!(1));
        rec.insert("a".to_string(), json!(2));
        let ds = Dataset::new(vec!["b".to_string(), "a".to_string()], vec![rec]);
        assert_eq!(ds.columns(), &["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_numeric_coercion_marks_missing() {
        let ds = sample();
        assert_eq!(ds.numeric_values("Year"), vec![Some(2000.0), None, Some(2001.0)]);
        assert_eq!(ds.numeric_values("Value"), vec![Some(10.0), Some(20.5), None]);
        assert_eq!(ds.present_numeric("Missing"), Vec::<f64>::new());
    }

    #[test]
    fn test_coerce_rejects_non_finite_strings() {
        assert_eq!(coerce_numeric(&json!("NaN")), None);
        assert_eq!(coerce_numeric(&json!("inf")), None);
        assert_eq!(coerce_numeric(&json!(" 3.5 ")), Some(3.5));
        assert_eq!(coerce_numeric(&json!([1])), None);
    }

    #[test]
    fn test_numeric_column_detection() {
        let ds = sample();
        // "Value" holds a string cell, so it is not a numeric column
        assert_eq!(ds.numeric_columns(), Vec::<&str>::new());

        let ds = Dataset::from_values(vec![json!({"x": 1, "y": "a"}), json!({"x": null, "y": 2})]);
        assert_eq!(ds.numeric_columns(), vec!["x"]);
    }

    #[test]
    fn test_numeric_frame_has_nulls_for_bad_cells() {
        let ds = sample();
        let df = ds.numeric_frame(&[("Year", "year"), ("Value", "value")]).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.column("year").unwrap().null_count(), 1);
        assert_eq!(df.column("value").unwrap().null_count(), 1);
    }
}
