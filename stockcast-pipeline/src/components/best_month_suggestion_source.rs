use crate::aggregation::best_per_group;
use crate::config::SuggestionPolicy;
use crate::source::{AnalysisContext, SuggestionSource};
use crate::types::{AggregateTable, Dimension, Suggestion};

/// Suggests stocking each product up before its best month. Needs no
/// regression, only the monthly sales table.
pub struct BestMonthSuggestionSource;

/// One suggestion per product, from the best row of `monthly_sales`
/// (keyed by product and month).
pub fn best_month_suggestions(monthly_sales: &AggregateTable, product_dimension: Dimension) -> Vec<Suggestion> {
    let best = best_per_group(monthly_sales, &[product_dimension]);
    best.rows
        .iter()
        .filter_map(|row| {
            let product = best.key_value(row, product_dimension)?;
            let month = best.key_value(row, Dimension::Month)?;
            Some(Suggestion {
                product: product.to_string(),
                location: None,
                period: month.to_string(),
                message: format!(
                    "Increase stock of {} before {} due to high demand",
                    product, month
                ),
                measure_value: Some(row.total),
            })
        })
        .collect()
}

impl SuggestionSource for BestMonthSuggestionSource {
    fn enable(&self, ctx: &AnalysisContext<'_>) -> bool {
        ctx.config.policy == SuggestionPolicy::BestMonth
    }

    fn suggestions(&self, ctx: &AnalysisContext<'_>) -> Vec<Suggestion> {
        best_month_suggestions(
            &ctx.tables.monthly_sales,
            ctx.dataset.column_set.product_dimension(),
        )
    }
}
