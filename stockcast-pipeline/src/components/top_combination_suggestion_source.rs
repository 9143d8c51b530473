use crate::config::SuggestionPolicy;
use crate::source::{AnalysisContext, SuggestionSource};
use crate::types::{AggregateTable, Dimension, Suggestion};

/// Suggests restocking for each top-ranked product × location × month
/// combination. A product can appear several times or not at all.
pub struct TopCombinationSuggestionSource;

/// One suggestion per row of a ranking keyed by product, location and month.
pub fn combination_suggestions(ranking: &AggregateTable, product_dimension: Dimension) -> Vec<Suggestion> {
    ranking
        .rows
        .iter()
        .filter_map(|row| {
            let product = ranking.key_value(row, product_dimension)?;
            let location = ranking.key_value(row, Dimension::Location)?;
            let month = ranking.key_value(row, Dimension::Month)?;
            Some(Suggestion {
                product: product.to_string(),
                location: Some(location.to_string()),
                period: month.to_string(),
                message: format!(
                    "Increase stock of {} at {} before {}, one of the top selling combinations",
                    product, location, month
                ),
                measure_value: Some(row.total),
            })
        })
        .collect()
}

impl SuggestionSource for TopCombinationSuggestionSource {
    fn enable(&self, ctx: &AnalysisContext<'_>) -> bool {
        ctx.config.policy == SuggestionPolicy::TopCombinations && ctx.tables.top_combinations.is_some()
    }

    fn suggestions(&self, ctx: &AnalysisContext<'_>) -> Vec<Suggestion> {
        ctx.tables
            .top_combinations
            .as_ref()
            .map(|ranking| {
                combination_suggestions(ranking, ctx.dataset.column_set.product_dimension())
            })
            .unwrap_or_default()
    }
}
