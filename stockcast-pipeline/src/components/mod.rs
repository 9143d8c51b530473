pub mod best_month_suggestion_source;
pub mod minimum_sample_filter;
pub mod top_combination_suggestion_source;
pub mod top_n_selector;
pub mod trend_suggestion_source;
