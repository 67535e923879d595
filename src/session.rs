//! Session context
//!
//! Holds what one user's interactions share: the current dataset, the last
//! fetch selection, and the analysis of that dataset. Every handler receives
//! the session explicitly; nothing lives in global state.

use crate::analysis::{AnalysisEngine, AnalysisReport};
use crate::catalog::FetchQuery;
use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::error::{AnalysisError, Result};
use crate::ingestion::DatasetSource;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

pub struct SessionContext {
    id: Uuid,
    created_at: DateTime<Utc>,
    engine: AnalysisEngine,
    dataset: Option<Dataset>,
    last_query: Option<FetchQuery>,
    report: Option<AnalysisReport>,
}

impl SessionContext {
    pub fn new(config: &AnalysisConfig) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, "Session started");
        Self {
            id,
            created_at: Utc::now(),
            engine: AnalysisEngine::new(config),
            dataset: None,
            last_query: None,
            report: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn last_query(&self) -> Option<&FetchQuery> {
        self.last_query.as_ref()
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    /// Replace the current dataset (e.g. a new upload) and analyse it.
    pub fn load_dataset(&mut self, dataset: Dataset) -> Result<&AnalysisReport> {
        let report = self.engine.analyze(&dataset)?;
        info!(session = %self.id, rows = dataset.row_count(), "Dataset loaded");
        self.dataset = Some(dataset);
        Ok(&*self.report.insert(report))
    }

    /// Fetch a series for `query` and make it the current dataset. On failure
    /// the previous dataset and query are kept.
    pub fn fetch(&mut self, source: &dyn DatasetSource, query: FetchQuery) -> Result<&AnalysisReport> {
        let dataset = source.fetch(&query)?;
        info!(
            session = %self.id,
            source = source.source_id(),
            source_type = source.source_type(),
            "Fetched dataset"
        );
        let report = self.engine.analyze(&dataset)?;
        self.last_query = Some(query);
        self.dataset = Some(dataset);
        Ok(&*self.report.insert(report))
    }

    pub fn ask(&self, question: &str) -> Result<String> {
        match (&self.dataset, &self.report) {
            (Some(dataset), Some(report)) => Ok(self.engine.ask(dataset, report, question)),
            _ => Err(AnalysisError::NoDataset),
        }
    }

    pub fn clear(&mut self) {
        self.dataset = None;
        self.last_query = None;
        self.report = None;
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}
