use crate::aggregation::AggregateTables;
use crate::config::AnalysisConfig;
use crate::sales_loader::SalesDataset;
use crate::trend::TrendAnalysis;
use crate::types::Suggestion;
use crate::util;

/// Everything computed for one request before suggestions are generated.
pub struct AnalysisContext<'a> {
    pub config: &'a AnalysisConfig,
    pub dataset: &'a SalesDataset,
    pub tables: &'a AggregateTables,
    /// Present only when the trend policy ran the regression.
    pub trends: Option<&'a TrendAnalysis>,
}

/// A suggestion source maps already-computed facts to restock suggestions.
pub trait SuggestionSource: Send + Sync {
    /// Decide if this source should run for the given request.
    fn enable(&self, _ctx: &AnalysisContext<'_>) -> bool {
        true
    }

    /// Produce suggestions from the context.
    fn suggestions(&self, ctx: &AnalysisContext<'_>) -> Vec<Suggestion>;

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
