//! Default analysis parameters.
//!
//! These are the process-wide defaults; every one of them can be overridden
//! per run through `AnalysisConfig` in `stockcast-pipeline`.

/// Minimum number of rows an entity needs before a trend line is fitted.
pub const DEFAULT_MIN_SAMPLES: usize = 10;

/// Number of date-sorted rows returned in the preview table.
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Size of the top products ranking.
pub const DEFAULT_TOP_PRODUCTS: usize = 5;

/// Size of the product × location × month ranking.
pub const DEFAULT_TOP_COMBINATIONS: usize = 10;

/// Months per year, the stride of the time index.
pub const MONTHS_PER_YEAR: i64 = 12;
