//! Result assembly.
//!
//! Bundles already-computed pieces into the response object. Nothing here
//! computes new statistics.

use serde::Serialize;

use crate::aggregation::AggregateTables;
use crate::config::AnalysisConfig;
use crate::sales_loader::SalesDataset;
use crate::trend::TrendAnalysis;
use crate::types::{AggregateTable, SalesRecord, Suggestion, TrendResult};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub records_processed: usize,
    pub total_units: f64,
    /// Entities a trend line was fitted for. Zero when no regression ran.
    pub entities_analyzed: usize,
    pub entities_below_threshold: usize,
    pub suggestion_count: usize,
}

/// The response bundle for one analysis request.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// First rows of the date-sorted dataset.
    pub table_data: Vec<SalesRecord>,
    pub monthly_sales: AggregateTable,
    pub top_products: AggregateTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_sales: Option<AggregateTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_sales: Option<AggregateTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_combinations: Option<AggregateTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_results: Option<Vec<TrendResult>>,
    pub restock_suggestions: Vec<Suggestion>,
    pub summary: ReportSummary,
}

pub fn assemble(
    dataset: &SalesDataset,
    config: &AnalysisConfig,
    tables: AggregateTables,
    trends: Option<TrendAnalysis>,
    suggestions: Vec<Suggestion>,
) -> AnalysisReport {
    let (entities_analyzed, entities_below_threshold) = trends
        .as_ref()
        .map(|t| (t.results.len(), t.skipped.len()))
        .unwrap_or((0, 0));

    let summary = ReportSummary {
        records_processed: dataset.len(),
        total_units: dataset.total_units(),
        entities_analyzed,
        entities_below_threshold,
        suggestion_count: suggestions.len(),
    };

    AnalysisReport {
        table_data: dataset.preview(config.preview_rows),
        monthly_sales: tables.monthly_sales,
        top_products: tables.top_products,
        category_sales: tables.category_sales,
        location_sales: tables.location_sales,
        top_combinations: tables.top_combinations,
        trend_results: trends.map(|t| t.results),
        restock_suggestions: suggestions,
        summary,
    }
}
