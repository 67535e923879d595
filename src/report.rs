//! Report Assembler - Renders analysis results as a text block

use crate::describe::DatasetStats;
use crate::query::format_number;
use crate::trend::{KeyMetrics, TrendMetrics, TrendOutcome, TrendPoint};

pub const UNAVAILABLE: &str = "unavailable";

fn percent_or_unavailable(value: Option<f64>) -> String {
    value
        .filter(|v| v.is_finite())
        .map(|v| format!("{:.2}%", v))
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}

fn year_value(label: &str, point: &TrendPoint, unit: Option<&str>) -> String {
    let value = if point.value.is_finite() {
        match unit {
            Some(unit) => format!("{} {}", format_number(point.value), unit),
            None => format_number(point.value),
        }
    } else {
        UNAVAILABLE.to_string()
    };
    format!("  {} ({}): {}\n", label, point.year, value)
}

/// Pure formatting; computes nothing.
pub fn assemble(
    stats: &DatasetStats,
    trend: &TrendOutcome,
    key: Option<&KeyMetrics>,
    metrics: &TrendMetrics,
    recommendations: &[String],
) -> String {
    let mut content = String::new();

    content.push_str("Dataset overview\n");
    content.push_str(&format!("  Rows: {}\n", stats.rows));
    content.push_str(&format!("  Columns: {}\n", stats.columns));
    content.push_str(&format!("  Numeric columns: {}\n\n", stats.numeric_columns));

    content.push_str("Trend\n");
    content.push_str(&format!("  {}\n", trend.status_message()));
    if let Some(series) = trend.series() {
        content.push_str(&format!(
            "  Period: {}-{} ({} data points)\n",
            series.first().year,
            series.last().year,
            series.len()
        ));
    }
    if let Some(key) = key {
        content.push_str(&year_value("First year value", &key.first, key.unit.as_deref()));
        content.push_str(&year_value("Last year value", &key.last, key.unit.as_deref()));
    }
    content.push_str(&format!(
        "  Change over period: {}\n",
        percent_or_unavailable(metrics.change_percent)
    ));
    content.push_str(&format!(
        "  Volatility: {}\n\n",
        percent_or_unavailable(metrics.volatility_percent)
    ));

    content.push_str("Recommendations\n");
    for (i, rec) in recommendations.iter().enumerate() {
        content.push_str(&format!("  {}. {}\n", i + 1, rec));
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trend::{TrendPoint, TrendSeries};

    #[test]
    fn test_unavailable_placeholders() {
        let stats = DatasetStats { rows: 4, columns: 2, numeric_columns: 1 };
        let text = assemble(
            &stats,
            &TrendOutcome::Skipped,
            None,
            &TrendMetrics::unavailable(),
            &["Improve data coverage.".to_string()],
        );
        assert!(text.contains("Rows: 4"));
        assert!(text.contains("Numeric columns: 1"));
        assert!(text.contains("Trend analysis skipped"));
        assert!(text.contains("Change over period: unavailable"));
        assert!(text.contains("Volatility: unavailable"));
        assert!(text.contains("1. Improve data coverage."));
        assert!(!text.contains("First year value"));
    }

    #[test]
    fn test_computed_trend_lines() {
        let series = TrendSeries::from_points(vec![
            TrendPoint { year: 2010, value: 100.0 },
            TrendPoint { year: 2012, value: 121.0 },
        ])
        .unwrap();
        let metrics = TrendMetrics { change_percent: Some(21.0), volatility_percent: Some(0.0) };
        let key = KeyMetrics {
            first: *series.first(),
            last: *series.last(),
            unit: Some("tonnes".to_string()),
        };
        let recs = vec!["first".to_string(), "second".to_string()];
        let text = assemble(
            &DatasetStats { rows: 2, columns: 2, numeric_columns: 2 },
            &TrendOutcome::Computed(series),
            Some(&key),
            &metrics,
            &recs,
        );
        assert!(text.contains("Period: 2010-2012 (2 data points)"));
        assert!(text.contains("First year value (2010): 100.00 tonnes"));
        assert!(text.contains("Last year value (2012): 121.00 tonnes"));
        assert!(text.contains("Change over period: 21.00%"));
        assert!(text.contains("Volatility: 0.00%"));
        assert!(text.contains("2. second"));
    }

    #[test]
    fn test_key_metrics_without_unit_or_finite_value() {
        let series = TrendSeries::from_points(vec![
            TrendPoint { year: 2000, value: f64::INFINITY },
            TrendPoint { year: 2001, value: 1500.0 },
        ])
        .unwrap();
        let key = KeyMetrics { first: *series.first(), last: *series.last(), unit: None };
        let text = assemble(
            &DatasetStats { rows: 3, columns: 2, numeric_columns: 2 },
            &TrendOutcome::Computed(series),
            Some(&key),
            &TrendMetrics::unavailable(),
            &[],
        );
        assert!(text.contains("First year value (2000): unavailable"));
        assert!(text.contains("Last year value (2001): 1,500.00\n"));
        assert!(!text.contains("inf"));
    }
}
