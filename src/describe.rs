//! Descriptive statistics for the numeric columns of a dataset

use crate::dataset::Dataset;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Shape of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub rows: usize,
    pub columns: usize,
    pub numeric_columns: usize,
}

pub fn dataset_stats(dataset: &Dataset) -> DatasetStats {
    DatasetStats {
        rows: dataset.row_count(),
        columns: dataset.column_count(),
        numeric_columns: dataset.numeric_columns().len(),
    }
}

/// One row of the describe table. `std` uses one delta degree of freedom and
/// quartiles interpolate linearly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

pub fn describe_column(dataset: &Dataset, column: &str) -> Result<ColumnSummary> {
    let series = Series::new(column, dataset.numeric_values(column));
    let values = series.f64()?;
    let quantile = |q: f64| values.quantile(q, QuantileInterpolOptions::Linear);

    Ok(ColumnSummary {
        column: column.to_string(),
        count: values.len() - values.null_count(),
        mean: values.mean(),
        std: values.std(1).filter(|s| s.is_finite()),
        min: values.min(),
        q25: quantile(0.25)?,
        median: quantile(0.5)?,
        q75: quantile(0.75)?,
        max: values.max(),
    })
}

/// Summaries for every numeric column, in column order.
pub fn describe(dataset: &Dataset) -> Result<Vec<ColumnSummary>> {
    dataset
        .numeric_columns()
        .into_iter()
        .map(|column| describe_column(dataset, column))
        .collect()
}
