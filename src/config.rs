//! Analysis configuration
//!
//! Candidate column names per semantic role and the recommendation
//! thresholds. Loaded from a JSON file, then overridden by `AGRISTAT_*`
//! environment variables.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const ENV_GROWTH_THRESHOLD: &str = "AGRISTAT_GROWTH_THRESHOLD";
pub const ENV_DECLINE_THRESHOLD: &str = "AGRISTAT_DECLINE_THRESHOLD";
pub const ENV_HIGH_VOLATILITY: &str = "AGRISTAT_HIGH_VOLATILITY";
pub const ENV_LOW_VOLATILITY: &str = "AGRISTAT_LOW_VOLATILITY";

/// Percentage thresholds used by the recommendation rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    /// Change above this is growth
    pub growth: f64,
    /// Change below this is decline
    pub decline: f64,
    /// Volatility above this is high
    pub high_volatility: f64,
    /// Volatility below this is low
    pub low_volatility: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            growth: 5.0,
            decline: -5.0,
            high_volatility: 20.0,
            low_volatility: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Year-like column names, highest priority first
    pub year_candidates: Vec<String>,
    /// Value-like column names, highest priority first
    pub value_candidates: Vec<String>,
    pub thresholds: RecommendationThresholds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            year_candidates: vec!["Year".to_string(), "year".to_string(), "YEAR".to_string()],
            value_candidates: vec!["Value".to_string(), "value".to_string(), "VALUE".to_string()],
            thresholds: RecommendationThresholds::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "Loaded analysis config");
        config.validate()?;
        Ok(config)
    }

    /// Apply `AGRISTAT_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets: [(&str, &mut f64); 4] = [
            (ENV_GROWTH_THRESHOLD, &mut self.thresholds.growth),
            (ENV_DECLINE_THRESHOLD, &mut self.thresholds.decline),
            (ENV_HIGH_VOLATILITY, &mut self.thresholds.high_volatility),
            (ENV_LOW_VOLATILITY, &mut self.thresholds.low_volatility),
        ];
        for (key, slot) in targets {
            if let Some(raw) = lookup(key) {
                *slot = raw.trim().parse::<f64>().map_err(|e| {
                    AnalysisError::Config(format!("{} must be a number, got '{}': {}", key, raw, e))
                })?;
                debug!(key, value = *slot, "Applied threshold override");
            }
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.year_candidates.is_empty() || self.value_candidates.is_empty() {
            return Err(AnalysisError::Config(
                "candidate column lists must not be empty".to_string(),
            ));
        }
        let t = &self.thresholds;
        let all = [t.growth, t.decline, t.high_volatility, t.low_volatility];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::Config("thresholds must be finite".to_string()));
        }
        if t.decline > t.growth {
            return Err(AnalysisError::Config(format!(
                "decline threshold {} exceeds growth threshold {}",
                t.decline, t.growth
            )));
        }
        if t.low_volatility > t.high_volatility {
            return Err(AnalysisError::Config(format!(
                "low volatility threshold {} exceeds high volatility threshold {}",
                t.low_volatility, t.high_volatility
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"thresholds": {"growth": 10.0}}"#).unwrap();
        assert_eq!(config.thresholds.growth, 10.0);
        assert_eq!(config.thresholds.decline, -5.0);
        assert_eq!(config.year_candidates, vec!["Year", "year", "YEAR"]);
    }

    #[test]
    fn test_overrides_are_applied() {
        let env: HashMap<&str, &str> =
            [(ENV_HIGH_VOLATILITY, "30"), (ENV_LOW_VOLATILITY, " 2.5 ")].into_iter().collect();
        let config = AnalysisConfig::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.thresholds.high_volatility, 30.0);
        assert_eq!(config.thresholds.low_volatility, 2.5);
        assert_eq!(config.thresholds.growth, 5.0);
    }

    #[test]
    fn test_bad_override_is_a_config_error() {
        let err = AnalysisConfig::default()
            .with_overrides(|k| (k == ENV_GROWTH_THRESHOLD).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut config = AnalysisConfig::default();
        config.thresholds.decline = 10.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_candidates_rejected() {
        let config = AnalysisConfig {
            year_candidates: vec![],
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
