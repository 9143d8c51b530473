//! Sales analytics: ingestion, aggregation, per-entity demand trends and
//! restock suggestions.

pub mod aggregation;
pub mod components;
pub mod config;
pub mod error;
pub mod filter;
pub mod pipelines;
pub mod report;
pub mod sales_loader;
pub mod selector;
pub mod source;
pub mod trend;
pub mod types;
pub mod util;

pub use config::{AnalysisConfig, ColumnSet, SuggestionPolicy};
pub use error::{AnalysisError, AnalysisResult, ErrorBody};
pub use pipelines::sales_analysis::SalesAnalysisPipeline;
pub use report::AnalysisReport;
pub use sales_loader::{DatasetUpload, SalesDataset};
