//! Per-run analysis configuration.
//!
//! Every field has a default, so an empty TOML file is a valid config.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockcast_stats::thresholds::{
    DEFAULT_MIN_SAMPLES, DEFAULT_PREVIEW_ROWS, DEFAULT_TOP_COMBINATIONS, DEFAULT_TOP_PRODUCTS,
};

use crate::types::{columns, Dimension};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Which set of columns an upload must carry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnSet {
    /// Date, Product ID, Category, Price, Units Sold.
    #[default]
    Catalog,
    /// Date, Product Name, Location, Units Sold, Product Count.
    Regional,
}

impl ColumnSet {
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            ColumnSet::Catalog => &[
                columns::DATE,
                columns::PRODUCT_ID,
                columns::CATEGORY,
                columns::PRICE,
                columns::UNITS_SOLD,
            ],
            ColumnSet::Regional => &[
                columns::DATE,
                columns::PRODUCT_NAME,
                columns::LOCATION,
                columns::UNITS_SOLD,
                columns::PRODUCT_COUNT,
            ],
        }
    }

    /// Dimension carrying the product identifier.
    pub fn product_dimension(self) -> Dimension {
        match self {
            ColumnSet::Catalog => Dimension::ProductId,
            ColumnSet::Regional => Dimension::ProductName,
        }
    }

    pub fn has_location(self) -> bool {
        matches!(self, ColumnSet::Regional)
    }
}

impl fmt::Display for ColumnSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSet::Catalog => write!(f, "catalog"),
            ColumnSet::Regional => write!(f, "regional"),
        }
    }
}

impl FromStr for ColumnSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "catalog" => Ok(ColumnSet::Catalog),
            "regional" => Ok(ColumnSet::Regional),
            other => Err(format!(
                "unknown column set '{}', expected 'catalog' or 'regional'",
                other
            )),
        }
    }
}

/// How restock suggestions are derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionPolicy {
    /// Per-entity regression; the slope sign picks the message.
    #[default]
    Trend,
    /// No regression; one suggestion per product for its best month.
    BestMonth,
    /// One suggestion per top-ranked product × location × month combination.
    TopCombinations,
}

impl fmt::Display for SuggestionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionPolicy::Trend => write!(f, "trend"),
            SuggestionPolicy::BestMonth => write!(f, "best-month"),
            SuggestionPolicy::TopCombinations => write!(f, "top-combinations"),
        }
    }
}

impl FromStr for SuggestionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trend" => Ok(SuggestionPolicy::Trend),
            "best-month" => Ok(SuggestionPolicy::BestMonth),
            "top-combinations" => Ok(SuggestionPolicy::TopCombinations),
            other => Err(format!(
                "unknown policy '{}', expected 'trend', 'best-month' or 'top-combinations'",
                other
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub column_set: ColumnSet,
    pub policy: SuggestionPolicy,
    /// Entities with fewer rows than this get no trend line.
    pub min_samples: usize,
    pub preview_rows: usize,
    pub top_products: usize,
    pub top_combinations: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            column_set: ColumnSet::default(),
            policy: SuggestionPolicy::default(),
            min_samples: DEFAULT_MIN_SAMPLES,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            top_products: DEFAULT_TOP_PRODUCTS,
            top_combinations: DEFAULT_TOP_COMBINATIONS,
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }
}
