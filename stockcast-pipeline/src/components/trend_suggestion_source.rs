use crate::config::SuggestionPolicy;
use crate::source::{AnalysisContext, SuggestionSource};
use crate::types::{Suggestion, TrendDirection, TrendResult};

/// Turns fitted trend lines into suggestions: rising entities should be
/// stocked up before their peak month, the rest held steady.
pub struct TrendSuggestionSource;

/// Suggestion for one trend result. The period is always the historical
/// peak, whichever way the slope points.
pub fn trend_suggestion(trend: &TrendResult) -> Suggestion {
    let message = match trend.direction {
        TrendDirection::Rising => format!(
            "Increase stock of {} before {}, demand rising",
            trend.entity, trend.peak_period
        ),
        TrendDirection::StableOrDeclining => format!(
            "Maintain stock of {}, trend stable around {}",
            trend.entity, trend.peak_period
        ),
    };

    Suggestion {
        product: trend.entity.product.clone(),
        location: trend.entity.location.clone(),
        period: trend.peak_period.clone(),
        message,
        measure_value: Some(trend.peak_units),
    }
}

impl SuggestionSource for TrendSuggestionSource {
    fn enable(&self, ctx: &AnalysisContext<'_>) -> bool {
        ctx.config.policy == SuggestionPolicy::Trend && ctx.trends.is_some()
    }

    fn suggestions(&self, ctx: &AnalysisContext<'_>) -> Vec<Suggestion> {
        ctx.trends
            .map(|analysis| analysis.results.iter().map(trend_suggestion).collect())
            .unwrap_or_default()
    }
}
