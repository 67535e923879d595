//! Simulated Source - Artificial yearly series for demonstrations
//!
//! Produces one record per requested year with the same columns a real fetch
//! returns: `Year, Value, Unit, Country, Item, Domain, Metric`. The series is a
//! seeded random walk, so the same query and seed always give the same data.

use crate::catalog::FetchQuery;
use crate::dataset::{Dataset, Record};
use crate::error::Result;
use crate::ingestion::connector::DatasetSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use tracing::info;

pub const SIMULATED_COLUMNS: [&str; 7] = ["Year", "Value", "Unit", "Country", "Item", "Domain", "Metric"];

/// Simulated Source - Generates a plausible series per query
pub struct SimulatedSource {
    source_id: String,
    seed: u64,
    max_step: f64,
}

impl SimulatedSource {
    pub fn new(source_id: String, seed: u64) -> Self {
        Self {
            source_id,
            seed,
            max_step: 0.12,
        }
    }

    /// Largest relative year-on-year move (0.12 = ±12%)
    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = max_step.abs();
        self
    }

    fn unit_for(metric: &str) -> &'static str {
        match metric {
            "Production" | "Import Quantity" | "Export Quantity" => "tonnes",
            "Yield" => "hg/ha",
            "Area Harvested" => "ha",
            "Value" | "Producer Price" | "Consumer Price" => "USD",
            "Food Supply" => "kcal/capita/day",
            "Dietary Energy Supply" => "%",
            "Emissions" | "Carbon Stock" => "kt",
            _ => "units",
        }
    }

    fn rng_for(&self, item_code: u32, area_code: u32) -> StdRng {
        let mix = self.seed ^ ((item_code as u64) << 32) ^ area_code as u64;
        StdRng::seed_from_u64(mix)
    }
}

impl DatasetSource for SimulatedSource {
    fn fetch(&self, query: &FetchQuery) -> Result<Dataset> {
        let codes = query.validate()?;
        let mut rng = self.rng_for(codes.item_code, codes.area_code);
        let unit = Self::unit_for(&query.metric);

        let mut value: f64 = rng.gen_range(1_000.0..1_000_000.0);
        let mut records = Vec::new();
        for year in query.years() {
            let mut row = Record::new();
            row.insert("Year".to_string(), json!(year));
            row.insert("Value".to_string(), json!((value * 100.0).round() / 100.0));
            row.insert("Unit".to_string(), json!(unit));
            row.insert("Country".to_string(), json!(query.country));
            row.insert("Item".to_string(), json!(query.commodity));
            row.insert("Domain".to_string(), json!(codes.domain_code));
            row.insert("Metric".to_string(), json!(query.metric));
            records.push(row);

            let step = if self.max_step > 0.0 {
                rng.gen_range(-self.max_step..self.max_step)
            } else {
                0.0
            };
            value = (value * (1.0 + step)).max(0.0);
        }

        info!(
            source = %self.source_id,
            metric = %query.metric,
            commodity = %query.commodity,
            country = %query.country,
            rows = records.len(),
            "Generated simulated series"
        );

        let columns = SIMULATED_COLUMNS.iter().map(|c| c.to_string()).collect();
        Ok(Dataset::new(columns, records))
    }

    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn source_type(&self) -> &str {
        "simulator"
    }
}
