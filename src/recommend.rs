//! Recommendation Engine - Threshold rules over trend metrics
//!
//! Two independent rules, growth/decline first and volatility second. When the
//! change is undefined the growth rule is replaced by a data-coverage advice, so
//! the list is never empty.

use crate::config::RecommendationThresholds;
use crate::trend::TrendMetrics;

pub const GROWTH_ADVICE: &str = "Sustain growth by investing in productivity and market access.";
pub const DECLINE_ADVICE: &str =
    "Address the decline by diversifying production and strengthening support for affected producers.";
pub const STABLE_ADVICE: &str = "Maintain stability while exploring opportunities for incremental growth.";
pub const DATA_COVERAGE_ADVICE: &str =
    "Improve data coverage: a reliable year and value series is needed before trend-based advice can be given.";
pub const HIGH_VOLATILITY_ADVICE: &str =
    "Introduce buffering mechanisms such as storage reserves or price stabilization to manage high volatility.";
pub const LOW_VOLATILITY_ADVICE: &str =
    "Conditions are stable; focus on efficiency gains and long-term planning.";

/// Recommendation Engine
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine {
    thresholds: RecommendationThresholds,
}

impl RecommendationEngine {
    pub fn new(thresholds: RecommendationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn recommend(&self, metrics: &TrendMetrics) -> Vec<String> {
        let t = &self.thresholds;
        let mut out = Vec::with_capacity(2);

        let primary = match metrics.change_percent {
            Some(change) if change > t.growth => GROWTH_ADVICE,
            Some(change) if change < t.decline => DECLINE_ADVICE,
            Some(_) => STABLE_ADVICE,
            None => DATA_COVERAGE_ADVICE,
        };
        out.push(primary.to_string());

        if let Some(vol) = metrics.volatility_percent.filter(|v| !v.is_nan()) {
            if vol > t.high_volatility {
                out.push(HIGH_VOLATILITY_ADVICE.to_string());
            } else if vol < t.low_volatility {
                out.push(LOW_VOLATILITY_ADVICE.to_string());
            }
        }

        out
    }
}

/// Recommendations under the default thresholds
pub fn recommend(metrics: &TrendMetrics) -> Vec<String> {
    RecommendationEngine::default().recommend(metrics)
}
