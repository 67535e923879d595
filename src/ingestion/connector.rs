//! Dataset Source Trait - Abstract interface for whatever supplies a time series

use crate::catalog::FetchQuery;
use crate::dataset::Dataset;
use crate::error::Result;

/// A collaborator that turns a catalogue selection into a dataset.
///
/// Implementations:
/// - SimulatedSource: deterministic artificial series
/// - a statistics API client (lives outside this crate)
pub trait DatasetSource {
    /// Fetch the series for a validated query
    fn fetch(&self, query: &FetchQuery) -> Result<Dataset>;

    /// Get source ID (unique identifier)
    fn source_id(&self) -> &str;

    /// Get source type (e.g., "simulator", "api")
    fn source_type(&self) -> &str;
}
