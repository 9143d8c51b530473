use crate::aggregation::AggregateTables;
use crate::components::best_month_suggestion_source::BestMonthSuggestionSource;
use crate::components::minimum_sample_filter::MinimumSampleFilter;
use crate::components::top_combination_suggestion_source::TopCombinationSuggestionSource;
use crate::components::trend_suggestion_source::TrendSuggestionSource;
use crate::config::{AnalysisConfig, SuggestionPolicy};
use crate::error::{AnalysisError, AnalysisResult};
use crate::filter::Filter;
use crate::report::{assemble, AnalysisReport};
use crate::sales_loader::{decode_upload, DatasetUpload, SalesDataset};
use crate::source::{AnalysisContext, SuggestionSource};
use crate::trend::{analyze_trends, EntitySeries};
use crate::types::Suggestion;

/// The sales analysis pipeline.
///
/// Pipeline flow:
/// 1. Decode the upload into a normalized dataset
/// 2. Build the aggregation and ranking tables
/// 3. MinimumSampleFilter drops small entities, then per-entity trend lines
///    are fitted (trend policy only)
/// 4. Every enabled SuggestionSource maps the facts to suggestions
/// 5. The report is assembled
///
/// A run either returns a complete report or one error; nothing is kept
/// between runs.
pub struct SalesAnalysisPipeline {
    config: AnalysisConfig,
    entity_filters: Vec<Box<dyn Filter<EntitySeries>>>,
    sources: Vec<Box<dyn SuggestionSource>>,
}

impl SalesAnalysisPipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        let entity_filters: Vec<Box<dyn Filter<EntitySeries>>> =
            vec![Box::new(MinimumSampleFilter::new(config.min_samples))];

        let sources: Vec<Box<dyn SuggestionSource>> = vec![
            Box::new(TrendSuggestionSource),
            Box::new(BestMonthSuggestionSource),
            Box::new(TopCombinationSuggestionSource),
        ];

        Self {
            config,
            entity_filters,
            sources,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Decode an upload and analyze it.
    pub fn run_upload(&self, upload: Option<&DatasetUpload>) -> AnalysisResult<AnalysisReport> {
        let dataset = decode_upload(upload, self.config.column_set)?;
        self.execute(&dataset)
    }

    /// Analyze an already-normalized dataset.
    pub fn execute(&self, dataset: &SalesDataset) -> AnalysisResult<AnalysisReport> {
        if dataset.is_empty() {
            return Err(AnalysisError::EmptyDataset);
        }

        let tables = AggregateTables::compute(dataset, &self.config);

        let trends = match self.config.policy {
            SuggestionPolicy::Trend => Some(analyze_trends(dataset, &self.entity_filters)),
            _ => None,
        };

        let ctx = AnalysisContext {
            config: &self.config,
            dataset,
            tables: &tables,
            trends: trends.as_ref(),
        };

        let mut suggestions: Vec<Suggestion> = Vec::new();
        for source in self.sources.iter().filter(|s| s.enable(&ctx)) {
            let produced = source.suggestions(&ctx);
            log::info!("{} produced {} suggestions", source.name(), produced.len());
            suggestions.extend(produced);
        }

        Ok(assemble(dataset, &self.config, tables, trends, suggestions))
    }
}

impl Default for SalesAnalysisPipeline {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
