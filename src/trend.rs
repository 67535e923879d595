//! Trend Computer
//!
//! Aggregates a value column by year and derives the two scalar metrics the
//! rest of the analysis works from:
//! - change over the period, in percent of the first year
//! - volatility, the standard deviation of year-over-year changes in percent
//!
//! Absent metrics are `None` and never stand in as zero.

use crate::column_resolver::ColumnResolution;
use crate::dataset::Dataset;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

const YEAR: &str = "year";
const VALUE: &str = "value";
const UNIT: &str = "unit";

/// One aggregated year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub year: i64,
    pub value: f64,
}

/// Year-ascending aggregate series; never empty and no duplicate years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    points: Vec<TrendPoint>,
}

impl TrendSeries {
    /// Sorts by year and sums duplicates. Returns `None` when empty.
    pub fn from_points(mut points: Vec<TrendPoint>) -> Option<Self> {
        points.sort_by_key(|p| p.year);
        let mut merged: Vec<TrendPoint> = Vec::with_capacity(points.len());
        for point in points {
            match merged.last_mut() {
                Some(last) if last.year == point.year => last.value += point.value,
                _ => merged.push(point),
            }
        }
        (!merged.is_empty()).then_some(Self { points: merged })
    }

    pub fn points(&self) -> &[TrendPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> &TrendPoint {
        &self.points[0]
    }

    pub fn last(&self) -> &TrendPoint {
        &self.points[self.points.len() - 1]
    }

    pub fn direction(&self) -> TrendDirection {
        if self.last().value >= self.first().value {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Increasing => write!(f, "increasing"),
            TrendDirection::Decreasing => write!(f, "decreasing"),
        }
    }
}

/// What trend computation produced for a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "series", rename_all = "snake_case")]
pub enum TrendOutcome {
    /// Year or value column unresolved; nothing was computed
    Skipped,
    /// Every row was dropped while coercing to numbers
    NoUsableData,
    Computed(TrendSeries),
}

impl TrendOutcome {
    pub fn series(&self) -> Option<&TrendSeries> {
        match self {
            TrendOutcome::Computed(series) => Some(series),
            _ => None,
        }
    }

    pub fn status_message(&self) -> &'static str {
        match self {
            TrendOutcome::Skipped => "Trend analysis skipped: no year and value columns found.",
            TrendOutcome::NoUsableData => "Trend analysis skipped: the dataset contains no usable numeric data.",
            TrendOutcome::Computed(_) => "Trend analysis completed.",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendMetrics {
    /// `None` when there is no series or the first year is zero
    pub change_percent: Option<f64>,
    /// `None` when there are fewer than two points or the result is not finite
    pub volatility_percent: Option<f64>,
}

impl TrendMetrics {
    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// Year-over-year change for one year; the first year has none
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualChange {
    pub year: i64,
    pub change_percent: Option<f64>,
}

/// Values of the first and last aggregated years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub first: TrendPoint,
    pub last: TrendPoint,
    /// Set only when a unit column holds a single distinct unit
    pub unit: Option<String>,
}

/// Compute the trend for whatever columns were resolved. Unresolved columns
/// short-circuit to `Skipped`.
pub fn trend_for(dataset: &Dataset, resolution: &ColumnResolution) -> Result<TrendOutcome> {
    match (resolution.year.as_deref(), resolution.value.as_deref()) {
        (Some(year), Some(value)) => compute_trend(dataset, year, value),
        _ => {
            info!("Trend analysis skipped: year or value column unresolved");
            Ok(TrendOutcome::Skipped)
        }
    }
}

/// Coerce both columns, drop incomplete rows, sum values per year and sort
/// ascending. Fractional years are truncated before grouping.
pub fn compute_trend(dataset: &Dataset, year_column: &str, value_column: &str) -> Result<TrendOutcome> {
    let frame = dataset.numeric_frame(&[(year_column, YEAR), (value_column, VALUE)])?;

    let grouped = frame
        .lazy()
        .filter(col(YEAR).is_not_null().and(col(VALUE).is_not_null()))
        .with_column(col(YEAR).cast(DataType::Int64))
        .group_by([col(YEAR)])
        .agg([col(VALUE).sum()])
        .sort_by_exprs([col(YEAR)], SortMultipleOptions::default())
        .collect()?;

    let years = grouped.column(YEAR)?.i64()?;
    let values = grouped.column(VALUE)?.f64()?;
    let points: Vec<TrendPoint> = years
        .into_iter()
        .zip(values.into_iter())
        .filter_map(|(year, value)| Some(TrendPoint { year: year?, value: value? }))
        .collect();

    debug!(
        year_column,
        value_column,
        rows = dataset.row_count(),
        years = points.len(),
        "Aggregated value column by year"
    );

    Ok(match TrendSeries::from_points(points) {
        Some(series) => TrendOutcome::Computed(series),
        None => {
            info!(year_column, value_column, "Dataset contains no usable numeric data");
            TrendOutcome::NoUsableData
        }
    })
}

/// Percent change between consecutive points, in percent. A zero previous
/// value yields a non-finite entry.
fn consecutive_changes(series: &TrendSeries) -> Vec<f64> {
    series
        .points()
        .windows(2)
        .map(|w| (w[1].value - w[0].value) / w[0].value * 100.0)
        .collect()
}

pub fn compute_metrics(series: &TrendSeries) -> Result<TrendMetrics> {
    let first = series.first().value;
    let last = series.last().value;
    let change_percent = if first != 0.0 {
        Some((last - first) / first * 100.0).filter(|c| c.is_finite())
    } else {
        None
    };

    let volatility_percent = if series.len() < 2 {
        None
    } else {
        let changes = consecutive_changes(series);
        if changes.iter().all(|c| c.is_finite()) {
            // population deviation: a two-point series has one change and zero spread
            Series::new("yoy_change", changes)
                .f64()?
                .std(0)
                .filter(|v| v.is_finite())
        } else {
            None
        }
    };

    Ok(TrendMetrics {
        change_percent,
        volatility_percent,
    })
}

/// Metrics for an outcome; anything but a computed series has none.
pub fn metrics_for(outcome: &TrendOutcome) -> Result<TrendMetrics> {
    match outcome.series() {
        Some(series) => compute_metrics(series),
        None => Ok(TrendMetrics::unavailable()),
    }
}

/// Year-over-year table. Changes from a zero year are `None`.
pub fn annual_changes(series: &TrendSeries) -> Vec<AnnualChange> {
    let points = series.points();
    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let change_percent = i
                .checked_sub(1)
                .map(|prev| points[prev].value)
                .filter(|prev| *prev != 0.0)
                .map(|prev| (point.value - prev) / prev * 100.0)
                .filter(|c| c.is_finite());
            AnnualChange {
                year: point.year,
                change_percent,
            }
        })
        .collect()
}

pub fn key_metrics(dataset: &Dataset, series: &TrendSeries) -> KeyMetrics {
    KeyMetrics {
        first: *series.first(),
        last: *series.last(),
        unit: single_unit(dataset),
    }
}

/// The unit shared by every row; mixed or absent units give `None`.
fn single_unit(dataset: &Dataset) -> Option<String> {
    use itertools::Itertools;

    let column = dataset.columns().iter().find(|c| c.eq_ignore_ascii_case(UNIT))?;
    let units: Vec<&str> = dataset
        .records()
        .iter()
        .filter_map(|r| r.get(column.as_str())?.as_str())
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unique()
        .collect();
    match units.as_slice() {
        [unit] => Some(unit.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset(rows: Vec<serde_json::Value>) -> Dataset {
        Dataset::from_values(rows)
    }

    fn series(points: &[(i64, f64)]) -> TrendSeries {
        TrendSeries::from_points(points.iter().map(|&(year, value)| TrendPoint { year, value }).collect())
            .unwrap()
    }

    #[test]
    fn test_same_year_rows_are_summed() {
        let ds = dataset(vec![
            json!({"Year": 2000, "Value": 10}),
            json!({"Year": 2000, "Value": 20}),
            json!({"Year": 2001, "Value": 15}),
        ]);
        let outcome = compute_trend(&ds, "Year", "Value").unwrap();
        let s = outcome.series().unwrap();
        assert_eq!(
            s.points(),
            &[TrendPoint { year: 2000, value: 30.0 }, TrendPoint { year: 2001, value: 15.0 }]
        );
        let metrics = compute_metrics(s).unwrap();
        assert!((metrics.change_percent.unwrap() - -50.0).abs() < 1e-9);
    }

    #[test]
    fn test_unsorted_input_is_sorted_and_bad_rows_dropped() {
        let ds = dataset(vec![
            json!({"Year": "2003", "Value": "7"}),
            json!({"Year": 2001, "Value": "n/a"}),
            json!({"Year": "unknown", "Value": 5}),
            json!({"Year": 2002, "Value": 3}),
        ]);
        let outcome = compute_trend(&ds, "Year", "Value").unwrap();
        let years: Vec<i64> = outcome.series().unwrap().points().iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2002, 2003]);
    }

    #[test]
    fn test_no_usable_rows() {
        let ds = dataset(vec![json!({"Year": "x", "Value": 1}), json!({"Year": 2000, "Value": "y"})]);
        assert_eq!(compute_trend(&ds, "Year", "Value").unwrap(), TrendOutcome::NoUsableData);
    }

    #[test]
    fn test_unresolved_columns_skip() {
        let ds = dataset(vec![json!({"Value": 1})]);
        let resolution = ColumnResolution { year: None, value: Some("Value".to_string()) };
        let outcome = trend_for(&ds, &resolution).unwrap();
        assert_eq!(outcome, TrendOutcome::Skipped);
        assert_eq!(metrics_for(&outcome).unwrap(), TrendMetrics::unavailable());
    }

    #[test]
    fn test_zero_first_year_has_no_change() {
        let metrics = compute_metrics(&series(&[(2000, 0.0), (2001, 10.0), (2002, 20.0)])).unwrap();
        assert_eq!(metrics.change_percent, None);
        // the 0 -> 10 step is infinite, so volatility is undefined too
        assert_eq!(metrics.volatility_percent, None);
    }

    #[test]
    fn test_single_point_has_no_volatility() {
        let metrics = compute_metrics(&series(&[(2000, 50.0)])).unwrap();
        assert_eq!(metrics.change_percent, Some(0.0));
        assert_eq!(metrics.volatility_percent, None);
    }

    #[test]
    fn test_two_points_have_real_volatility() {
        let metrics = compute_metrics(&series(&[(2000, 50.0), (2001, 60.0)])).unwrap();
        assert_eq!(metrics.volatility_percent, Some(0.0));
    }

    #[test]
    fn test_volatility_of_uneven_changes() {
        // changes: +10%, -10% -> population std of [10, -10] is 10
        let metrics = compute_metrics(&series(&[(2000, 100.0), (2001, 110.0), (2002, 99.0)])).unwrap();
        let vol = metrics.volatility_percent.unwrap();
        assert!((vol - 10.0).abs() < 1e-9, "got {}", vol);
    }

    #[test]
    fn test_direction_ties_are_increasing() {
        assert_eq!(series(&[(2000, 5.0), (2001, 1.0), (2002, 5.0)]).direction(), TrendDirection::Increasing);
        assert_eq!(series(&[(2000, 5.0), (2001, 4.0)]).direction(), TrendDirection::Decreasing);
    }

    #[test]
    fn test_annual_changes() {
        let table = annual_changes(&series(&[(2000, 0.0), (2001, 10.0), (2002, 15.0)]));
        assert_eq!(table[0].change_percent, None);
        assert_eq!(table[1].change_percent, None);
        assert_eq!(table[2].change_percent, Some(50.0));
    }

    #[test]
    fn test_overflowing_year_has_no_annual_change() {
        let ds = dataset(vec![
            json!({"Year": 2000, "Value": 1e308}),
            json!({"Year": 2000, "Value": 1e308}),
            json!({"Year": 2001, "Value": 5}),
        ]);
        let outcome = compute_trend(&ds, "Year", "Value").unwrap();
        let table = annual_changes(outcome.series().unwrap());
        assert_eq!(table[1], AnnualChange { year: 2001, change_percent: None });
        assert_eq!(compute_metrics(outcome.series().unwrap()).unwrap(), TrendMetrics::unavailable());
    }

    #[test]
    fn test_key_metrics_carry_single_unit() {
        let ds = dataset(vec![
            json!({"Year": 2011, "Value": 7, "Unit": "tonnes"}),
            json!({"Year": 2010, "Value": 4, "Unit": "tonnes"}),
            json!({"Year": 2010, "Value": 1, "Unit": null}),
        ]);
        let outcome = compute_trend(&ds, "Year", "Value").unwrap();
        let key = key_metrics(&ds, outcome.series().unwrap());
        assert_eq!(key.first, TrendPoint { year: 2010, value: 5.0 });
        assert_eq!(key.last, TrendPoint { year: 2011, value: 7.0 });
        assert_eq!(key.unit.as_deref(), Some("tonnes"));

        let mixed = dataset(vec![
            json!({"Year": 2010, "Value": 4, "unit": "tonnes"}),
            json!({"Year": 2011, "Value": 7, "unit": "kg"}),
        ]);
        let outcome = compute_trend(&mixed, "Year", "Value").unwrap();
        assert_eq!(key_metrics(&mixed, outcome.series().unwrap()).unit, None);
    }

    #[test]
    fn test_from_points_merges_duplicates() {
        let s = series(&[(2001, 1.0), (2000, 2.0), (2001, 3.0)]);
        assert_eq!(s.points(), &[TrendPoint { year: 2000, value: 2.0 }, TrendPoint { year: 2001, value: 4.0 }]);
        assert!(TrendSeries::from_points(vec![]).is_none());
    }
}
