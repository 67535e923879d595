use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unknown catalogue entry: {0}")]
    UnknownCatalogEntry(String),

    #[error("No dataset loaded in this session")]
    NoDataset,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(String),
}

impl From<polars::error::PolarsError> for AnalysisError {
    fn from(err: polars::error::PolarsError) -> Self {
        AnalysisError::Polars(err.to_string())
    }
}

impl From<csv::Error> for AnalysisError {
    fn from(err: csv::Error) -> Self {
        AnalysisError::Csv(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
