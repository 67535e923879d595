//! Analysis pipeline
//!
//! One synchronous pass over a dataset: resolve columns, aggregate the trend,
//! derive metrics, recommend, describe, and render the summary. The dataset is
//! only read.

use crate::column_resolver::{ColumnResolution, ColumnResolver};
use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::describe::{dataset_stats, describe, ColumnSummary, DatasetStats};
use crate::error::Result;
use crate::query::{answer, QueryContext};
use crate::recommend::RecommendationEngine;
use crate::report::assemble;
use crate::trend::{
    annual_changes, key_metrics, metrics_for, trend_for, AnnualChange, KeyMetrics, TrendMetrics, TrendOutcome,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Everything one analysis pass produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub stats: DatasetStats,
    pub describe: Vec<ColumnSummary>,
    pub resolution: ColumnResolution,
    pub trend: TrendOutcome,
    pub key_metrics: Option<KeyMetrics>,
    pub metrics: TrendMetrics,
    pub annual_changes: Vec<AnnualChange>,
    pub recommendations: Vec<String>,
    pub summary: String,
}

pub struct AnalysisEngine {
    resolver: ColumnResolver,
    recommender: RecommendationEngine,
}

impl AnalysisEngine {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            resolver: ColumnResolver::from_config(config),
            recommender: RecommendationEngine::new(config.thresholds),
        }
    }

    pub fn analyze(&self, dataset: &Dataset) -> Result<AnalysisReport> {
        let started = Instant::now();

        let stats = dataset_stats(dataset);
        let describe = describe(dataset)?;
        let resolution = self.resolver.resolve_all(dataset.columns());
        let trend = trend_for(dataset, &resolution)?;
        let key = trend.series().map(|series| key_metrics(dataset, series));
        let metrics = metrics_for(&trend)?;
        let annual_changes = trend.series().map(annual_changes).unwrap_or_default();
        let recommendations = self.recommender.recommend(&metrics);
        let summary = assemble(&stats, &trend, key.as_ref(), &metrics, &recommendations);

        info!(
            rows = stats.rows,
            columns = stats.columns,
            numeric_columns = stats.numeric_columns,
            change_percent = ?metrics.change_percent,
            volatility_percent = ?metrics.volatility_percent,
            recommendations = recommendations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis complete"
        );

        Ok(AnalysisReport {
            stats,
            describe,
            resolution,
            trend,
            key_metrics: key,
            metrics,
            annual_changes,
            recommendations,
            summary,
        })
    }

    /// Answer a question against a dataset and the report computed from it.
    pub fn ask(&self, dataset: &Dataset, report: &AnalysisReport, question: &str) -> String {
        answer(
            question,
            &QueryContext {
                dataset,
                resolution: &report.resolution,
                trend: &report.trend,
                metrics: &report.metrics,
            },
        )
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}
