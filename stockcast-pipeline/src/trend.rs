//! Per-entity demand trend analysis.
//!
//! Each entity (a product, or a product at one location) gets its own
//! least-squares line of units sold against the month time index, fitted on
//! that entity's rows only. The peak period is looked up separately from
//! the entity's monthly totals and never read off the regression.

use std::collections::HashMap;

use rayon::prelude::*;

use stockcast_stats::regression::fit_least_squares;

use crate::aggregation::{best_per_group, group_sum};
use crate::config::ColumnSet;
use crate::filter::Filter;
use crate::sales_loader::SalesDataset;
use crate::types::{Dimension, EntityKey, Measure, SalesRecord, TrendDirection, TrendResult};

/// All rows belonging to one entity, in file order.
#[derive(Clone, Debug)]
pub struct EntitySeries {
    pub entity: EntityKey,
    pub records: Vec<SalesRecord>,
}

impl EntitySeries {
    pub fn observations(&self) -> usize {
        self.records.len()
    }
}

/// Outcome of trend analysis for one request.
#[derive(Clone, Debug, Default)]
pub struct TrendAnalysis {
    /// One result per analyzed entity, in order of first appearance.
    pub results: Vec<TrendResult>,
    /// Entities skipped by the filters. Not an error.
    pub skipped: Vec<EntityKey>,
}

fn entity_key(record: &SalesRecord, column_set: ColumnSet) -> EntityKey {
    match column_set {
        ColumnSet::Catalog => EntityKey::product(record.product.clone()),
        ColumnSet::Regional => EntityKey {
            product: record.product.clone(),
            location: record.location.clone(),
        },
    }
}

/// Split the dataset into one series per entity, in order of first appearance.
pub fn partition_entities(dataset: &SalesDataset) -> Vec<EntitySeries> {
    let mut index: HashMap<EntityKey, usize> = HashMap::new();
    let mut series: Vec<EntitySeries> = Vec::new();

    for record in &dataset.records {
        let key = entity_key(record, dataset.column_set);
        match index.get(&key) {
            Some(&i) => series[i].records.push(record.clone()),
            None => {
                index.insert(key.clone(), series.len());
                series.push(EntitySeries {
                    entity: key,
                    records: vec![record.clone()],
                });
            }
        }
    }

    series
}

/// Month with the highest total units for these records, with that total.
/// The earliest month wins ties.
pub fn peak_period(records: &[SalesRecord]) -> Option<(String, f64)> {
    let monthly = group_sum(records, &[Dimension::Month], Measure::UnitsSold);
    best_per_group(&monthly, &[])
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.key.into_iter().next().map(|month| (month, row.total)))
}

/// Fit one entity's trend line and look up its peak period.
pub fn fit_entity(series: &EntitySeries) -> Option<TrendResult> {
    let x: Vec<f64> = series
        .records
        .iter()
        .map(|r| r.calendar.time_index as f64)
        .collect();
    let y: Vec<f64> = series.records.iter().map(|r| r.units_sold).collect();

    let fit = fit_least_squares(&x, &y)?;
    let (peak_period, peak_units) = peak_period(&series.records)?;

    Some(TrendResult {
        entity: series.entity.clone(),
        slope: fit.slope,
        intercept: fit.intercept,
        r_squared: fit.r_squared,
        observations: fit.observations,
        direction: TrendDirection::from_slope(fit.slope),
        peak_period,
        peak_units,
    })
}

/// Run the filters over every entity, then fit the survivors in parallel.
///
/// Fits are collected in entity order regardless of which worker finishes
/// first.
pub fn analyze_trends(
    dataset: &SalesDataset,
    filters: &[Box<dyn Filter<EntitySeries>>],
) -> TrendAnalysis {
    let mut series = partition_entities(dataset);
    let total = series.len();
    let mut skipped = Vec::new();

    for filter in filters {
        let result = filter.filter(series);
        if !result.removed.is_empty() {
            log::info!(
                "{} removed {} of {} entities",
                filter.name(),
                result.removed.len(),
                total
            );
        }
        skipped.extend(result.removed.into_iter().map(|s| s.entity));
        series = result.kept;
    }

    let results: Vec<TrendResult> = series.par_iter().filter_map(fit_entity).collect();

    log::info!(
        "fitted {} trend lines ({} entities skipped)",
        results.len(),
        skipped.len()
    );

    TrendAnalysis { results, skipped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::minimum_sample_filter::MinimumSampleFilter;
    use chrono::NaiveDate;

    fn monthly_rows(product: &str, start_year: i32, units: &[f64]) -> Vec<SalesRecord> {
        units
            .iter()
            .enumerate()
            .map(|(i, &u)| {
                let year = start_year + (i / 12) as i32;
                let month = (i % 12) as u32 + 1;
                SalesRecord::new(NaiveDate::from_ymd_opt(year, month, 15).unwrap(), product, u)
            })
            .collect()
    }

    fn filters(min_samples: usize) -> Vec<Box<dyn Filter<EntitySeries>>> {
        vec![Box::new(MinimumSampleFilter::new(min_samples))]
    }

    #[test]
    fn partition_keeps_first_appearance_order() {
        let mut records = monthly_rows("B", 2024, &[1.0, 2.0]);
        records.extend(monthly_rows("A", 2024, &[3.0]));
        records.extend(monthly_rows("B", 2025, &[4.0]));
        let dataset = SalesDataset::new(ColumnSet::Catalog, records);
        let series = partition_entities(&dataset);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].entity, EntityKey::product("B"));
        assert_eq!(series[0].observations(), 3);
        assert_eq!(series[1].entity, EntityKey::product("A"));
    }

    #[test]
    fn regional_entities_include_location() {
        let records = vec![
            SalesRecord::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "Mouse", 1.0)
                .with_location("North"),
            SalesRecord::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "Mouse", 1.0)
                .with_location("South"),
        ];
        let dataset = SalesDataset::new(ColumnSet::Regional, records);
        let series = partition_entities(&dataset);
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].entity, EntityKey::at_location("Mouse", "South"));
    }

    #[test]
    fn peak_period_is_highest_monthly_total() {
        // March appears twice and sums to 10, beating May's single 8.
        let mut records = monthly_rows("A", 2024, &[1.0, 1.0, 4.0, 1.0, 8.0]);
        records.extend(monthly_rows("A", 2025, &[1.0, 1.0, 6.0]));
        assert_eq!(peak_period(&records), Some(("March".to_string(), 10.0)));
    }

    #[test]
    fn peak_period_ties_pick_earliest_month_seen() {
        let records = monthly_rows("A", 2024, &[5.0, 5.0, 5.0]);
        assert_eq!(peak_period(&records).unwrap().0, "January");
    }

    #[test]
    fn fit_entity_reads_slope_sign() {
        let rising = EntitySeries {
            entity: EntityKey::product("A"),
            records: monthly_rows("A", 2023, &(1..=12).map(f64::from).collect::<Vec<_>>()),
        };
        let result = fit_entity(&rising).unwrap();
        assert!((result.slope - 1.0).abs() < 1e-9);
        assert!((result.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(result.direction, TrendDirection::Rising);
        assert_eq!(result.peak_period, "December");
        assert_eq!(result.observations, 12);
    }

    #[test]
    fn small_entities_are_skipped_without_error() {
        let mut records = monthly_rows("BIG", 2023, &[10.0; 12]);
        records.extend(monthly_rows("SMALL", 2023, &[10.0; 3]));
        let dataset = SalesDataset::new(ColumnSet::Catalog, records);
        let analysis = analyze_trends(&dataset, &filters(10));
        assert_eq!(analysis.results.len(), 1);
        assert_eq!(analysis.results[0].entity, EntityKey::product("BIG"));
        assert_eq!(analysis.skipped, vec![EntityKey::product("SMALL")]);
    }

    #[test]
    fn results_keep_entity_order() {
        let mut records = Vec::new();
        let names: Vec<String> = (0..40).map(|i| format!("P{:02}", i)).collect();
        for name in &names {
            records.extend(monthly_rows(name, 2023, &[1.0, 2.0, 3.0]));
        }
        let dataset = SalesDataset::new(ColumnSet::Catalog, records);
        let analysis = analyze_trends(&dataset, &filters(1));
        let order: Vec<&str> = analysis
            .results
            .iter()
            .map(|r| r.entity.product.as_str())
            .collect();
        let expected: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(order, expected);
    }
}
