use std::path::PathBuf;
use std::process;
use std::time::Instant;

use chrono::Utc;
use clap::Parser;
use serde::Serialize;

use stockcast_pipeline::config::{AnalysisConfig, ColumnSet, SuggestionPolicy};
use stockcast_pipeline::error::ErrorBody;
use stockcast_pipeline::pipelines::sales_analysis::SalesAnalysisPipeline;
use stockcast_pipeline::report::AnalysisReport;
use stockcast_pipeline::sales_loader::DatasetUpload;
use stockcast_pipeline::types::AggregateTable;

/// Analyze a sales CSV and print restock suggestions.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Sales CSV to analyze
    csv_path: PathBuf,

    /// TOML file with analysis settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input column set: catalog or regional
    #[arg(long)]
    columns: Option<ColumnSet>,

    /// Suggestion policy: trend, best-month or top-combinations
    #[arg(long)]
    policy: Option<SuggestionPolicy>,

    /// Minimum rows an entity needs before its trend is fitted
    #[arg(long)]
    min_samples: Option<usize>,

    /// Rows included in the table preview
    #[arg(long)]
    preview: Option<usize>,

    /// Number of top products to report
    #[arg(long)]
    top: Option<usize>,

    /// Number of product, location and month combinations to rank
    #[arg(long)]
    top_combinations: Option<usize>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// File settings first, then any flag given on the command line.
    fn resolve_config(&self) -> Result<AnalysisConfig, String> {
        let mut config = match &self.config {
            Some(path) => {
                log::info!("Loading config from: {}", path.display());
                AnalysisConfig::from_file(path).map_err(|e| e.to_string())?
            }
            None => AnalysisConfig::default(),
        };
        if let Some(columns) = self.columns {
            config.column_set = columns;
        }
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
        if let Some(min_samples) = self.min_samples {
            config.min_samples = min_samples;
        }
        if let Some(preview) = self.preview {
            config.preview_rows = preview;
        }
        if let Some(top) = self.top {
            config.top_products = top;
        }
        if let Some(top_combinations) = self.top_combinations {
            config.top_combinations = top_combinations;
        }
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RunJson<'a> {
    generated_at: String,
    source_file: String,
    pipeline_ms: u128,
    #[serde(flatten)]
    report: &'a AnalysisReport,
}

#[derive(Serialize)]
struct ErrorJson<'a> {
    generated_at: String,
    error: ErrorBody,
    source_file: &'a str,
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

/// Format a number with comma thousands separators.
fn format_units(amount: f64) -> String {
    let whole = amount.abs().round() as u64;
    let sign = if amount < 0.0 { "-" } else { "" };

    let s = whole.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    format!("{}{}", sign, result.chars().rev().collect::<String>())
}

fn print_table(title: &str, table: &AggregateTable) {
    println!("  {}", title);
    for row in &table.rows {
        println!("    {:40} {:>12}", row.key.join(" / "), format_units(row.total));
    }
    println!();
}

fn print_human(report: &AnalysisReport, config: &AnalysisConfig, load_ms: u128, pipeline_ms: u128) {
    let rule = "\u{2550}".repeat(62);
    println!();
    println!("  \u{2554}{}\u{2557}", rule);
    println!("  \u{2551}{:^62}\u{2551}", "STOCKCAST \u{00b7} Restock Report");
    println!("  \u{255a}{}\u{255d}", rule);
    println!();

    let summary = &report.summary;
    println!(
        "  {} records processed  \u{00b7}  {} units sold  \u{00b7}  {} columns  \u{00b7}  {} policy",
        summary.records_processed,
        format_units(summary.total_units),
        config.column_set,
        config.policy
    );
    if report.trend_results.is_some() {
        println!(
            "  {} entities fitted  \u{00b7}  {} below {} samples",
            summary.entities_analyzed, summary.entities_below_threshold, config.min_samples
        );
    }
    println!();

    print_table("Top products", &report.top_products);
    if let Some(locations) = &report.location_sales {
        print_table("Units by location", locations);
    }
    if let Some(categories) = &report.category_sales {
        print_table("Units by category", categories);
    }

    if report.restock_suggestions.is_empty() {
        println!("  No restock suggestions.");
    } else {
        println!("  {:\u{2500}<64}", "");
        for (i, s) in report.restock_suggestions.iter().enumerate() {
            println!("  {:>3}. {}", i + 1, s.message);
        }
        println!("  {:\u{2500}<64}", "");
    }

    println!();
    println!(
        "  \u{23f1}  CSV read in {}ms \u{00b7} Pipeline ran in {}ms \u{00b7} Total {}ms",
        load_ms,
        pipeline_ms,
        load_ms + pipeline_ms
    );
    println!();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let config = match cli.resolve_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };
    let source_file = cli.csv_path.display().to_string();

    let load_start = Instant::now();
    let upload = match DatasetUpload::from_path(&cli.csv_path) {
        Ok(u) => Some(u),
        Err(e) => {
            log::warn!("could not read {}: {}", source_file, e);
            None
        }
    };
    let load_ms = load_start.elapsed().as_millis();

    let pipeline_start = Instant::now();
    let pipeline = SalesAnalysisPipeline::new(config);
    let result = pipeline.run_upload(upload.as_ref());
    let pipeline_ms = pipeline_start.elapsed().as_millis();

    match result {
        Ok(report) => {
            if cli.json {
                let run = RunJson {
                    generated_at: Utc::now().to_rfc3339(),
                    source_file,
                    pipeline_ms,
                    report: &report,
                };
                match serde_json::to_string_pretty(&run) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error encoding report: {}", e);
                        process::exit(1);
                    }
                }
            } else {
                print_human(&report, pipeline.config(), load_ms, pipeline_ms);
            }
        }
        Err(err) => {
            if cli.json {
                let body = ErrorJson {
                    generated_at: Utc::now().to_rfc3339(),
                    error: ErrorBody::from(&err),
                    source_file: &source_file,
                };
                if let Ok(json) = serde_json::to_string_pretty(&body) {
                    println!("{}", json);
                }
            } else {
                eprintln!("Error: {}", err);
            }
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_config_untouched() {
        let cli = Cli::parse_from(["stockcast-server", "sales.csv"]);
        assert_eq!(cli.csv_path, PathBuf::from("sales.csv"));
        assert!(!cli.json);
        assert_eq!(cli.resolve_config().unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "stockcast-server",
            "sales.csv",
            "--columns",
            "regional",
            "--policy",
            "top-combinations",
            "--min-samples",
            "3",
            "--preview",
            "25",
            "--top",
            "8",
            "--top-combinations",
            "12",
            "--json",
        ]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.column_set, ColumnSet::Regional);
        assert_eq!(config.policy, SuggestionPolicy::TopCombinations);
        assert_eq!(config.min_samples, 3);
        assert_eq!(config.preview_rows, 25);
        assert_eq!(config.top_products, 8);
        assert_eq!(config.top_combinations, 12);
        assert!(cli.json);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let parsed = Cli::try_parse_from(["stockcast-server", "sales.csv", "--policy", "random"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn unreadable_config_is_an_error() {
        let cli = Cli::parse_from([
            "stockcast-server",
            "sales.csv",
            "--config",
            "/nonexistent/stockcast.toml",
        ]);
        assert!(cli.resolve_config().is_err());
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(format_units(0.0), "0");
        assert_eq!(format_units(999.4), "999");
        assert_eq!(format_units(1234567.0), "1,234,567");
        assert_eq!(format_units(-4500.0), "-4,500");
    }
}
