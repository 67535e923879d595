//! Catalogue - Domain, commodity and country code tables
//!
//! These are the selectors a data source is parametrised by. The analysis core
//! never looks at them; they only travel with the dataset as metadata.

use crate::error::{AnalysisError, Result};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Earliest year the statistics database covers
pub const FIRST_YEAR: i32 = 1961;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    pub name: &'static str,
    pub code: &'static str,
    pub metrics: &'static [&'static str],
}

/// A named group of `(name, code)` entries, e.g. a commodity type or a region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeGroup {
    pub name: &'static str,
    pub entries: &'static [(&'static str, u32)],
}

impl CodeGroup {
    pub fn code_of(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, code)| *code)
    }
}

pub const DOMAINS: &[Domain] = &[
    Domain {
        name: "Production",
        code: "QCL",
        metrics: &["Production", "Yield", "Area Harvested"],
    },
    Domain {
        name: "Trade",
        code: "TCL",
        metrics: &["Import Quantity", "Export Quantity", "Value"],
    },
    Domain {
        name: "Food Security",
        code: "FS",
        metrics: &["Food Supply", "Dietary Energy Supply"],
    },
    Domain {
        name: "Prices",
        code: "PP",
        metrics: &["Producer Price", "Consumer Price"],
    },
    Domain {
        name: "Emissions",
        code: "GT",
        metrics: &["Emissions", "Carbon Stock"],
    },
];

pub const COMMODITY_GROUPS: &[CodeGroup] = &[
    CodeGroup {
        name: "Crops",
        entries: &[
            ("Wheat", 15), ("Rice", 27), ("Maize", 56), ("Soybeans", 236),
            ("Potatoes", 116), ("Tomatoes", 388), ("Coffee", 656), ("Tea", 667),
            ("Barley", 78), ("Sugarcane", 89), ("Cotton", 92), ("Bananas", 123),
            ("Oranges", 145), ("Apples", 167), ("Grapes", 189), ("Peanuts", 210),
        ],
    },
    CodeGroup {
        name: "Livestock",
        entries: &[
            ("Beef", 867), ("Poultry", 1058), ("Milk", 882), ("Eggs", 1062),
            ("Sheep", 1123), ("Goat", 1145), ("Pork", 1167), ("Fish", 1189),
            ("Honey", 1201), ("Wool", 1223), ("Buffalo", 1245),
        ],
    },
];

pub const REGIONS: &[CodeGroup] = &[
    CodeGroup {
        name: "Americas",
        entries: &[
            ("USA", 231), ("Brazil", 21), ("Canada", 39),
            ("Mexico", 142), ("Argentina", 10), ("Chile", 45),
            ("Colombia", 32), ("Peru", 51), ("Venezuela", 58),
        ],
    },
    CodeGroup {
        name: "Asia",
        entries: &[
            ("China", 351), ("India", 100), ("Pakistan", 165),
            ("Japan", 110), ("South Korea", 130), ("Indonesia", 101),
            ("Vietnam", 120), ("Thailand", 140), ("Malaysia", 150),
        ],
    },
    CodeGroup {
        name: "Europe",
        entries: &[
            ("France", 68), ("Germany", 79), ("Russia", 185),
            ("Italy", 106), ("United Kingdom", 234), ("Spain", 210),
            ("Netherlands", 150), ("Sweden", 160), ("Poland", 170),
        ],
    },
    CodeGroup {
        name: "Africa",
        entries: &[
            ("Nigeria", 159), ("South Africa", 205),
            ("Egypt", 59), ("Kenya", 117), ("Ethiopia", 62),
            ("Ghana", 45), ("Morocco", 78), ("Algeria", 89),
        ],
    },
    CodeGroup {
        name: "Oceania",
        entries: &[
            ("Australia", 36), ("New Zealand", 40),
            ("Fiji", 90), ("Papua New Guinea", 91), ("Samoa", 92),
        ],
    },
    CodeGroup {
        name: "Middle East",
        entries: &[
            ("Saudi Arabia", 250), ("Iran", 260), ("Turkey", 270),
            ("Iraq", 280), ("Israel", 290), ("Jordan", 300),
        ],
    },
];

pub fn find_domain(name: &str) -> Option<&'static Domain> {
    DOMAINS.iter().find(|d| d.name == name)
}

/// Locate a commodity in any group; returns `(group, code)`
pub fn find_commodity(name: &str) -> Option<(&'static str, u32)> {
    find_in(COMMODITY_GROUPS, name)
}

/// Locate a country in any region; returns `(region, code)`
pub fn find_country(name: &str) -> Option<(&'static str, u32)> {
    find_in(REGIONS, name)
}

fn find_in(groups: &'static [CodeGroup], name: &str) -> Option<(&'static str, u32)> {
    groups
        .iter()
        .find_map(|g| g.code_of(name).map(|code| (g.name, code)))
}

fn group_named(groups: &'static [CodeGroup], name: &str) -> Option<&'static CodeGroup> {
    groups.iter().find(|g| g.name == name)
}

/// Most recent year a query may ask for
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// The user's selection for one fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchQuery {
    pub domain: String,
    pub metric: String,
    pub commodity_group: String,
    pub commodity: String,
    pub region: String,
    pub country: String,
    pub start_year: i32,
    pub end_year: i32,
}

/// Codes a validated query maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCodes {
    pub domain_code: &'static str,
    pub item_code: u32,
    pub area_code: u32,
}

impl FetchQuery {
    /// Build a query from names, looking up the commodity group and region.
    pub fn new(
        domain: &str,
        metric: &str,
        commodity: &str,
        country: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<Self> {
        let (commodity_group, _) = find_commodity(commodity)
            .ok_or_else(|| AnalysisError::UnknownCatalogEntry(format!("commodity '{}'", commodity)))?;
        let (region, _) = find_country(country)
            .ok_or_else(|| AnalysisError::UnknownCatalogEntry(format!("country '{}'", country)))?;

        let query = Self {
            domain: domain.to_string(),
            metric: metric.to_string(),
            commodity_group: commodity_group.to_string(),
            commodity: commodity.to_string(),
            region: region.to_string(),
            country: country.to_string(),
            start_year,
            end_year,
        };
        query.validate()?;
        Ok(query)
    }

    /// Default year range: 2000 through last year
    pub fn default_years() -> (i32, i32) {
        (2000, current_year() - 1)
    }

    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.start_year..=self.end_year
    }

    pub fn validate(&self) -> Result<QueryCodes> {
        let domain = find_domain(&self.domain)
            .ok_or_else(|| AnalysisError::UnknownCatalogEntry(format!("domain '{}'", self.domain)))?;
        if !domain.metrics.contains(&self.metric.as_str()) {
            return Err(AnalysisError::InvalidQuery(format!(
                "metric '{}' is not available in domain '{}'",
                self.metric, self.domain
            )));
        }

        let item_code = group_named(COMMODITY_GROUPS, &self.commodity_group)
            .and_then(|g| g.code_of(&self.commodity))
            .ok_or_else(|| {
                AnalysisError::UnknownCatalogEntry(format!(
                    "commodity '{}' in group '{}'",
                    self.commodity, self.commodity_group
                ))
            })?;
        let area_code = group_named(REGIONS, &self.region)
            .and_then(|g| g.code_of(&self.country))
            .ok_or_else(|| {
                AnalysisError::UnknownCatalogEntry(format!(
                    "country '{}' in region '{}'",
                    self.country, self.region
                ))
            })?;

        let last = current_year();
        if self.start_year < FIRST_YEAR || self.end_year > last || self.start_year > self.end_year {
            return Err(AnalysisError::InvalidQuery(format!(
                "year range {}-{} must lie within {}-{}",
                self.start_year, self.end_year, FIRST_YEAR, last
            )));
        }

        Ok(QueryCodes {
            domain_code: domain.code,
            item_code,
            area_code,
        })
    }
}
