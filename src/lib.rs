pub mod analysis;
pub mod catalog;
pub mod column_resolver;
pub mod config;
pub mod dataset;
pub mod describe;
pub mod error;
pub mod ingestion;
pub mod query;
pub mod recommend;
pub mod report;
pub mod session;
pub mod trend;

pub use analysis::{AnalysisEngine, AnalysisReport};
pub use dataset::Dataset;
pub use error::{AnalysisError, Result};
pub use session::SessionContext;
