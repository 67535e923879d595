//! Query Answerer - Keyword rules over dataset aggregates
//!
//! There is no language understanding here. The question is lower-cased and
//! scanned for keywords; rule groups run in a fixed order and a later group
//! that applies replaces the answer of an earlier one:
//! 1. capability description (default)
//! 2. value aggregates: average/mean, total/sum, max/highest, min/lowest
//! 3. trend restatement
//! 4. year bounds: latest/max, earliest/min

use crate::column_resolver::ColumnResolution;
use crate::dataset::Dataset;
use crate::trend::{TrendMetrics, TrendOutcome};
use itertools::Itertools;
use lazy_static::lazy_static;
use num_format::{Locale, ToFormattedString};
use regex::Regex;
use tracing::debug;

pub const CAPABILITY_ANSWER: &str = "I can answer questions about the average (mean), total (sum), \
highest (max) and lowest (min) values, the overall trend, and the latest or earliest year in the dataset.";

lazy_static! {
    static ref AVERAGE: Regex = Regex::new(r"(?i)average|mean").unwrap();
    static ref TOTAL: Regex = Regex::new(r"(?i)total|sum").unwrap();
    static ref HIGHEST: Regex = Regex::new(r"(?i)max|highest").unwrap();
    static ref LOWEST: Regex = Regex::new(r"(?i)min|lowest").unwrap();
    static ref TREND: Regex = Regex::new(r"(?i)trend").unwrap();
    static ref YEAR: Regex = Regex::new(r"(?i)year").unwrap();
    static ref LATEST: Regex = Regex::new(r"(?i)latest|max").unwrap();
    static ref EARLIEST: Regex = Regex::new(r"(?i)earliest|min").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Aggregate {
    Mean,
    Sum,
    Max,
    Min,
}

impl Aggregate {
    fn detect(question: &str) -> Option<Self> {
        if AVERAGE.is_match(question) {
            Some(Aggregate::Mean)
        } else if TOTAL.is_match(question) {
            Some(Aggregate::Sum)
        } else if HIGHEST.is_match(question) {
            Some(Aggregate::Max)
        } else if LOWEST.is_match(question) {
            Some(Aggregate::Min)
        } else {
            None
        }
    }

    fn label(self) -> &'static str {
        match self {
            Aggregate::Mean => "average",
            Aggregate::Sum => "total",
            Aggregate::Max => "highest",
            Aggregate::Min => "lowest",
        }
    }

    fn apply(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let result = match self {
            Aggregate::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Aggregate::Sum => values.iter().sum(),
            Aggregate::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregate::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        };
        Some(result)
    }
}

/// Everything the answerer reads; all borrowed, nothing retained.
pub struct QueryContext<'a> {
    pub dataset: &'a Dataset,
    pub resolution: &'a ColumnResolution,
    pub trend: &'a TrendOutcome,
    pub metrics: &'a TrendMetrics,
}

pub fn answer(question: &str, ctx: &QueryContext<'_>) -> String {
    let mut response = CAPABILITY_ANSWER.to_string();
    let mut rules = Vec::new();

    if let Some(value_col) = ctx.resolution.value.as_deref() {
        if let Some(aggregate) = Aggregate::detect(question) {
            let values = ctx.dataset.present_numeric(value_col);
            response = match aggregate.apply(&values) {
                Some(result) if result.is_finite() => format!(
                    "The {} {} is {}.",
                    aggregate.label(),
                    value_col,
                    format_number(result)
                ),
                Some(_) => format!("The {} {} is unavailable.", aggregate.label(), value_col),
                None => format!("The column {} has no numeric values to aggregate.", value_col),
            };
            rules.push(aggregate.label());
        }
    }

    if TREND.is_match(question) {
        if let Some(series) = ctx.trend.series() {
            // an undefined change reads as increasing
            let direction = match ctx.metrics.change_percent {
                Some(change) if change < 0.0 => "decreasing",
                _ => "increasing",
            };
            let change = ctx
                .metrics
                .change_percent
                .map(|c| format!("{:.2}%", c))
                .unwrap_or_else(|| "unavailable".to_string());
            response = format!(
                "The overall trend from {} to {} is {} (change: {}).",
                series.first().year,
                series.last().year,
                direction,
                change
            );
            rules.push("trend");
        }
    }

    if YEAR.is_match(question) {
        if let Some(year_col) = ctx.resolution.year.as_deref() {
            let years = ctx.dataset.present_numeric(year_col);
            let bound = if LATEST.is_match(question) {
                Some(("latest", Aggregate::Max))
            } else if EARLIEST.is_match(question) {
                Some(("earliest", Aggregate::Min))
            } else {
                None
            };
            if let Some((label, aggregate)) = bound {
                response = match aggregate.apply(&years) {
                    Some(year) => format!("The {} year in the dataset is {}.", label, format_year(year)),
                    None => format!("The column {} has no numeric years.", year_col),
                };
                rules.push(label);
            }
        }
    }

    debug!(question, rules = %rules.iter().join(","), "Answered question");
    response
}

/// Two decimals with thousands separators, e.g. `1,234,567.89`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let grouped = whole
        .parse::<u128>()
        .map(|w| w.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| whole.to_string());
    let negative = value < 0.0 && fixed.bytes().any(|b| b != b'0' && b != b'.');
    format!("{}{}.{}", if negative { "-" } else { "" }, grouped, frac)
}

fn format_year(year: f64) -> String {
    if year.fract() == 0.0 && year.abs() < 1e15 {
        format!("{}", year as i64)
    } else {
        year.to_string()
    }
}
