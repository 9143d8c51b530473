use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use stockcast_stats::thresholds::MONTHS_PER_YEAR;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Header names as they appear in uploaded sales files.
pub mod columns {
    pub const DATE: &str = "Date";
    pub const PRODUCT_ID: &str = "Product ID";
    pub const PRODUCT_NAME: &str = "Product Name";
    pub const CATEGORY: &str = "Category";
    pub const PRICE: &str = "Price";
    pub const UNITS_SOLD: &str = "Units Sold";
    pub const LOCATION: &str = "Location";
    pub const PRODUCT_COUNT: &str = "Product Count";
    pub const MONTH: &str = "Month";
    pub const YEAR: &str = "Year";
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// Calendar fields derived once from a record's date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarFields {
    pub month_name: &'static str,
    pub month_number: u32,
    pub year: i32,
    /// `year * 12 + month_number`. Orders records by month across year
    /// boundaries and serves as the regression predictor.
    pub time_index: i64,
}

impl CalendarFields {
    pub fn derive(date: NaiveDate) -> Self {
        let month_number = date.month();
        let year = date.year();
        Self {
            month_name: MONTH_NAMES[date.month0() as usize],
            month_number,
            year,
            time_index: i64::from(year) * MONTHS_PER_YEAR + i64::from(month_number),
        }
    }
}

/// One normalized input row.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecord {
    pub date: NaiveDate,
    /// Product ID or Product Name, depending on the column set.
    pub product: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_count: Option<f64>,
    pub units_sold: f64,
    #[serde(flatten)]
    pub calendar: CalendarFields,
}

impl SalesRecord {
    /// Build a record and derive its calendar fields.
    pub fn new(date: NaiveDate, product: impl Into<String>, units_sold: f64) -> Self {
        Self {
            date,
            product: product.into(),
            category: None,
            location: None,
            price: None,
            product_count: None,
            units_sold,
            calendar: CalendarFields::derive(date),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_product_count(mut self, count: f64) -> Self {
        self.product_count = Some(count);
        self
    }
}

/// Identity of the unit a trend line is fitted for.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct EntityKey {
    pub product: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl EntityKey {
    pub fn product(product: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            location: None,
        }
    }

    pub fn at_location(product: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            location: Some(location.into()),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} @ {}", self.product, location),
            None => write!(f, "{}", self.product),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation types
// ---------------------------------------------------------------------------

/// An attribute records can be grouped by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    ProductId,
    ProductName,
    Category,
    Location,
    Month,
    Year,
}

impl Dimension {
    pub fn column_name(self) -> &'static str {
        match self {
            Dimension::ProductId => columns::PRODUCT_ID,
            Dimension::ProductName => columns::PRODUCT_NAME,
            Dimension::Category => columns::CATEGORY,
            Dimension::Location => columns::LOCATION,
            Dimension::Month => columns::MONTH,
            Dimension::Year => columns::YEAR,
        }
    }

    /// The record's value for this attribute. Absent optional attributes
    /// group under the empty string.
    pub fn value_of(self, record: &SalesRecord) -> String {
        match self {
            Dimension::ProductId | Dimension::ProductName => record.product.clone(),
            Dimension::Category => record.category.clone().unwrap_or_default(),
            Dimension::Location => record.location.clone().unwrap_or_default(),
            Dimension::Month => record.calendar.month_name.to_string(),
            Dimension::Year => record.calendar.year.to_string(),
        }
    }
}

/// A numeric quantity summed by aggregation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Measure {
    UnitsSold,
}

impl Measure {
    pub fn column_name(self) -> &'static str {
        match self {
            Measure::UnitsSold => columns::UNITS_SOLD,
        }
    }

    pub fn value_of(self, record: &SalesRecord) -> f64 {
        match self {
            Measure::UnitsSold => record.units_sold,
        }
    }
}

/// One bucket of a grouped sum.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupAggregate {
    /// Key values, in the owning table's dimension order.
    pub key: Vec<String>,
    pub total: f64,
}

/// The result of a group-and-sum: rows share the same dimensions and measure.
///
/// Serializes as a list of objects keyed by column name, e.g.
/// `{"Product ID": "P1", "Month": "March", "Units Sold": 42.0}`.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateTable {
    pub dimensions: Vec<Dimension>,
    pub measure: Measure,
    pub rows: Vec<GroupAggregate>,
}

impl AggregateTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `dimension` within this table's key, if present.
    pub fn position(&self, dimension: Dimension) -> Option<usize> {
        self.dimensions.iter().position(|d| *d == dimension)
    }

    /// Value of `dimension` in `row`, if the table is keyed by it.
    pub fn key_value<'a>(&self, row: &'a GroupAggregate, dimension: Dimension) -> Option<&'a str> {
        self.position(dimension)
            .and_then(|i| row.key.get(i))
            .map(String::as_str)
    }

    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.total).sum()
    }
}

struct RowView<'a> {
    table: &'a AggregateTable,
    row: &'a GroupAggregate,
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.table.dimensions.len() + 1))?;
        for (dimension, value) in self.table.dimensions.iter().zip(self.row.key.iter()) {
            map.serialize_entry(dimension.column_name(), value)?;
        }
        map.serialize_entry(self.table.measure.column_name(), &self.row.total)?;
        map.end()
    }
}

impl Serialize for AggregateTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows.iter().map(|row| RowView { table: self, row }))
    }
}

// ---------------------------------------------------------------------------
// Trend and suggestion types
// ---------------------------------------------------------------------------

/// Which way demand is heading, read from the sign of the fitted slope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Rising,
    StableOrDeclining,
}

impl TrendDirection {
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            TrendDirection::Rising
        } else {
            TrendDirection::StableOrDeclining
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Rising => write!(f, "\u{2191} Rising"),
            TrendDirection::StableOrDeclining => write!(f, "\u{2192} Stable"),
        }
    }
}

/// Per-entity demand trend.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendResult {
    #[serde(flatten)]
    pub entity: EntityKey,
    /// Units sold per step of the time index.
    pub slope: f64,
    pub intercept: f64,
    /// Share of the variance in units sold explained by the line.
    pub r_squared: f64,
    pub observations: usize,
    pub direction: TrendDirection,
    /// Month name with the highest total units for this entity.
    pub peak_period: String,
    pub peak_units: f64,
}

/// A restock recommendation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub product: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub period: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure_value: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn calendar_fields_are_derived() {
        let fields = CalendarFields::derive(date(2024, 3, 17));
        assert_eq!(fields.month_name, "March");
        assert_eq!(fields.month_number, 3);
        assert_eq!(fields.year, 2024);
        assert_eq!(fields.time_index, 2024 * 12 + 3);
    }

    #[test]
    fn time_index_orders_across_year_boundary() {
        let december = CalendarFields::derive(date(2023, 12, 31));
        let january = CalendarFields::derive(date(2024, 1, 1));
        assert_eq!(january.time_index - december.time_index, 1);
    }

    #[test]
    fn time_index_ignores_day_of_month() {
        let early = CalendarFields::derive(date(2024, 5, 1));
        let late = CalendarFields::derive(date(2024, 5, 31));
        assert_eq!(early, late);
    }

    #[test]
    fn entity_key_display() {
        assert_eq!(EntityKey::product("P1").to_string(), "P1");
        assert_eq!(EntityKey::at_location("Mouse", "North").to_string(), "Mouse @ North");
    }

    #[test]
    fn direction_follows_slope_sign() {
        assert_eq!(TrendDirection::from_slope(0.5), TrendDirection::Rising);
        assert_eq!(TrendDirection::from_slope(0.0), TrendDirection::StableOrDeclining);
        assert_eq!(TrendDirection::from_slope(-2.0), TrendDirection::StableOrDeclining);
    }

    #[test]
    fn aggregate_table_serializes_with_column_names() {
        let table = AggregateTable {
            dimensions: vec![Dimension::ProductId, Dimension::Month],
            measure: Measure::UnitsSold,
            rows: vec![GroupAggregate {
                key: vec!["P1".into(), "March".into()],
                total: 42.0,
            }],
        };
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"Product ID": "P1", "Month": "March", "Units Sold": 42.0}])
        );
    }

    #[test]
    fn record_serializes_derived_fields() {
        let record = SalesRecord::new(date(2024, 2, 9), "P9", 3.0).with_category("Toys");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2024-02-09");
        assert_eq!(json["monthName"], "February");
        assert_eq!(json["timeIndex"], 2024 * 12 + 2);
        assert!(json.get("location").is_none());
    }
}
