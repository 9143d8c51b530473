//! Group-and-sum, top-N and best-per-group operators.
//!
//! All operators are pure: they read their inputs and return fresh tables.
//! Row order is always the order in which a key first appears, so results
//! are deterministic for a given input order.

use std::collections::HashMap;

use crate::components::top_n_selector::TopNSelector;
use crate::config::AnalysisConfig;
use crate::sales_loader::SalesDataset;
use crate::selector::Selector;
use crate::types::{AggregateTable, Dimension, GroupAggregate, Measure, SalesRecord};

/// Sum `measure` over every distinct combination of `dimensions`.
pub fn group_sum<'a, I>(records: I, dimensions: &[Dimension], measure: Measure) -> AggregateTable
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    let mut index: HashMap<Vec<String>, usize> = HashMap::new();
    let mut rows: Vec<GroupAggregate> = Vec::new();

    for record in records {
        let key: Vec<String> = dimensions.iter().map(|d| d.value_of(record)).collect();
        let value = measure.value_of(record);
        match index.get(&key) {
            Some(&i) => rows[i].total += value,
            None => {
                index.insert(key.clone(), rows.len());
                rows.push(GroupAggregate { key, total: value });
            }
        }
    }

    AggregateTable {
        dimensions: dimensions.to_vec(),
        measure,
        rows,
    }
}

/// The `n` rows with the largest totals, descending. Ties keep input order.
pub fn top_n(table: &AggregateTable, n: usize) -> AggregateTable {
    AggregateTable {
        dimensions: table.dimensions.clone(),
        measure: table.measure,
        rows: TopNSelector::new(n).select(table.rows.clone()),
    }
}

/// One row per distinct value of `group_by`: the row with the largest total
/// in that group, the earliest one on ties.
///
/// `group_by` dimensions the table is not keyed by are ignored; an empty
/// `group_by` selects the single best row of the whole table.
pub fn best_per_group(table: &AggregateTable, group_by: &[Dimension]) -> AggregateTable {
    let positions: Vec<usize> = group_by
        .iter()
        .filter_map(|d| table.position(*d))
        .collect();

    let mut index: HashMap<Vec<&str>, usize> = HashMap::new();
    let mut best: Vec<&GroupAggregate> = Vec::new();

    for row in &table.rows {
        let group: Vec<&str> = positions.iter().map(|&p| row.key[p].as_str()).collect();
        match index.get(&group) {
            Some(&i) => {
                if row.total > best[i].total {
                    best[i] = row;
                }
            }
            None => {
                index.insert(group, best.len());
                best.push(row);
            }
        }
    }

    AggregateTable {
        dimensions: table.dimensions.clone(),
        measure: table.measure,
        rows: best.into_iter().cloned().collect(),
    }
}

/// The aggregation and ranking tables reported for one request.
#[derive(Clone, Debug)]
pub struct AggregateTables {
    /// Units per product per month.
    pub monthly_sales: AggregateTable,
    pub top_products: AggregateTable,
    /// Catalog column set only.
    pub category_sales: Option<AggregateTable>,
    /// Regional column set only.
    pub location_sales: Option<AggregateTable>,
    /// Top product × location × month combinations. Regional column set only.
    pub top_combinations: Option<AggregateTable>,
}

impl AggregateTables {
    pub fn compute(dataset: &SalesDataset, config: &AnalysisConfig) -> Self {
        let records = &dataset.records;
        let product = dataset.column_set.product_dimension();

        let monthly_sales = group_sum(records, &[product, Dimension::Month], Measure::UnitsSold);
        let product_totals = group_sum(records, &[product], Measure::UnitsSold);
        let top_products = top_n(&product_totals, config.top_products);

        let (category_sales, location_sales, top_combinations) =
            if dataset.column_set.has_location() {
                let locations = group_sum(records, &[Dimension::Location], Measure::UnitsSold);
                let combinations = group_sum(
                    records,
                    &[product, Dimension::Location, Dimension::Month],
                    Measure::UnitsSold,
                );
                (
                    None,
                    Some(locations),
                    Some(top_n(&combinations, config.top_combinations)),
                )
            } else {
                let categories = group_sum(records, &[Dimension::Category], Measure::UnitsSold);
                (Some(categories), None, None)
            };

        log::debug!(
            "aggregated {} product-month buckets, {} products",
            monthly_sales.len(),
            product_totals.len()
        );

        Self {
            monthly_sales,
            top_products,
            category_sales,
            location_sales,
            top_combinations,
        }
    }
}
