//! Column Resolver - Maps semantic roles to the dataset's actual column names
//!
//! Uploaded datasets carry arbitrary headers. The analysis needs a year-like
//! column and a value-like column, each picked from an ordered list of
//! candidate names:
//! 1. Candidates are tried in priority order
//! 2. Only exact, case-sensitive matches count
//! 3. The first candidate present wins, whatever the data looks like
//!
//! When a role stays unresolved the resolver logs the closest header as a hint
//! for whoever is debugging the upload. The hint never changes the result.

use crate::config::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Semantic role a column can play in the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Year,
    Value,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::Year => write!(f, "year"),
            ColumnRole::Value => write!(f, "value"),
        }
    }
}

/// Result of column resolution; `None` means the role is unresolved
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnResolution {
    pub year: Option<String>,
    pub value: Option<String>,
}

impl ColumnResolution {
    pub fn get(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::Year => self.year.as_deref(),
            ColumnRole::Value => self.value.as_deref(),
        }
    }

    /// Both roles resolved, so a trend can be computed
    pub fn is_complete(&self) -> bool {
        self.year.is_some() && self.value.is_some()
    }
}

/// Return the first candidate that is one of `column_names`.
pub fn resolve<S: AsRef<str>>(column_names: &[S], candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .find(|candidate| column_names.iter().any(|c| c.as_ref() == candidate.as_str()))
        .cloned()
}

/// Column Resolver - Resolves every role from configured candidate lists
pub struct ColumnResolver {
    year_candidates: Vec<String>,
    value_candidates: Vec<String>,
}

impl ColumnResolver {
    pub fn new(year_candidates: Vec<String>, value_candidates: Vec<String>) -> Self {
        Self {
            year_candidates,
            value_candidates,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.year_candidates.clone(), config.value_candidates.clone())
    }

    pub fn candidates(&self, role: ColumnRole) -> &[String] {
        match role {
            ColumnRole::Year => &self.year_candidates,
            ColumnRole::Value => &self.value_candidates,
        }
    }

    pub fn resolve_role<S: AsRef<str>>(&self, column_names: &[S], role: ColumnRole) -> Option<String> {
        let found = resolve(column_names, self.candidates(role));
        match &found {
            Some(name) => debug!(%role, column = %name, "Resolved column"),
            None => match self.suggest(column_names, role) {
                Some((hint, score)) => warn!(
                    %role,
                    hint = %hint,
                    score,
                    "No candidate column matched; closest header shown as hint"
                ),
                None => warn!(%role, "No candidate column matched"),
            },
        }
        found
    }

    pub fn resolve_all<S: AsRef<str>>(&self, column_names: &[S]) -> ColumnResolution {
        ColumnResolution {
            year: self.resolve_role(column_names, ColumnRole::Year),
            value: self.resolve_role(column_names, ColumnRole::Value),
        }
    }

    /// Closest header to any candidate of `role` (Jaro-Winkler, case-folded).
    /// Diagnostic only.
    pub fn suggest<S: AsRef<str>>(&self, column_names: &[S], role: ColumnRole) -> Option<(String, f64)> {
        column_names
            .iter()
            .map(|name| {
                let folded = name.as_ref().to_lowercase();
                let score = self
                    .candidates(role)
                    .iter()
                    .map(|c| strsim::jaro_winkler(&folded, &c.to_lowercase()))
                    .fold(0.0_f64, f64::max);
                (name.as_ref().to_string(), score)
            })
            .filter(|(_, score)| *score >= 0.8)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }
}

impl Default for ColumnResolver {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}
