//! CSV Connector - Turns an uploaded CSV file into a dataset

use crate::dataset::{Dataset, Record};
use crate::error::Result;
use csv::ReaderBuilder;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Cell texts read as missing, the same set pandas treats as NA by default
const NA_TOKENS: &[&str] = &[
    "NA", "N/A", "n/a", "#N/A", "#N/A N/A", "#NA", "<NA>", "NaN", "-NaN", "nan", "-nan", "NULL", "null",
    "None", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

/// CSV Connector - Wraps provided CSV text and converts it into records.
pub struct CsvConnector {
    source_id: String,
    source_uri: Option<String>,
    csv_text: String,
}

impl CsvConnector {
    pub fn new(source_id: String, csv_text: String) -> Self {
        Self {
            source_id,
            source_uri: None,
            csv_text,
        }
    }

    /// Read the whole file; the file path becomes the source URI.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let csv_text = std::fs::read_to_string(path)?;
        let source_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self {
            source_id,
            source_uri: Some(path.display().to_string()),
            csv_text,
        })
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn source_uri(&self) -> Option<&str> {
        self.source_uri.as_deref()
    }

    fn coerce_cell(s: &str) -> Value {
        let trimmed = s.trim();
        if trimmed.is_empty() || NA_TOKENS.contains(&trimmed) {
            return Value::Null;
        }

        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Number(i.into());
        }

        if let Ok(f) = trimmed.parse::<f64>() {
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Value::Number(n);
            }
        }

        Value::String(trimmed.to_string())
    }

    /// Parse the CSV text. Short rows are padded with missing cells.
    pub fn read_dataset(&self) -> Result<Dataset> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(self.csv_text.as_bytes());

        let headers = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect::<Vec<_>>();

        let mut records = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let mut row = Record::new();

            for (idx, header) in headers.iter().enumerate() {
                let cell = record.get(idx).unwrap_or("");
                row.insert(header.clone(), Self::coerce_cell(cell));
            }

            records.push(row);
        }

        debug!(
            source = %self.source_id,
            uri = self.source_uri().unwrap_or("inline"),
            rows = records.len(),
            columns = headers.len(),
            "Parsed CSV upload"
        );
        Ok(Dataset::new(headers, records))
    }
}
