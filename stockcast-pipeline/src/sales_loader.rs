//! CSV sales data loader.
//!
//! Parses an uploaded sales file into normalized `SalesRecord`s. The header
//! must carry every column of the configured `ColumnSet`; other columns are
//! ignored. Any bad date or number aborts the whole load.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::config::ColumnSet;
use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{columns, SalesRecord};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// A file as handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct DatasetUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DatasetUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read an upload from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }

    fn is_csv(&self) -> bool {
        self.file_name.to_lowercase().ends_with(".csv")
    }
}

/// Normalized rows plus a date-ordered view of them.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    pub column_set: ColumnSet,
    /// Rows in file order.
    pub records: Vec<SalesRecord>,
    /// Indices into `records`, ascending by date; ties keep file order.
    date_order: Vec<usize>,
}

impl SalesDataset {
    pub fn new(column_set: ColumnSet, records: Vec<SalesRecord>) -> Self {
        let mut date_order: Vec<usize> = (0..records.len()).collect();
        date_order.sort_by_key(|&i| records[i].date);
        Self {
            column_set,
            records,
            date_order,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ascending by date.
    pub fn by_date(&self) -> impl Iterator<Item = &SalesRecord> + '_ {
        self.date_order.iter().map(move |&i| &self.records[i])
    }

    /// First `rows` records of the date-ordered view.
    pub fn preview(&self, rows: usize) -> Vec<SalesRecord> {
        self.by_date().take(rows).cloned().collect()
    }

    /// Total units sold across every record.
    pub fn total_units(&self) -> f64 {
        self.records.iter().map(|r| r.units_sold).sum()
    }
}

/// Validate and decode an upload handed over by the transport layer.
pub fn decode_upload(
    upload: Option<&DatasetUpload>,
    column_set: ColumnSet,
) -> AnalysisResult<SalesDataset> {
    let upload = upload.ok_or(AnalysisError::InputAbsent)?;
    if !upload.is_csv() {
        return Err(AnalysisError::UnsupportedFormat(format!(
            "'{}' is not a .csv file",
            upload.file_name
        )));
    }
    load_sales(upload.bytes.as_slice(), column_set)
}

/// Load sales records from a CSV reader.
pub fn load_sales<R: Read>(reader: R, column_set: ColumnSet) -> AnalysisResult<SalesDataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| AnalysisError::UnsupportedFormat(e.to_string()))?
        .clone();
    let layout = ColumnLayout::resolve(&headers, column_set)?;

    let mut records = Vec::new();
    for (row_num, result) in csv_reader.records().enumerate() {
        let line = row_num + 2;
        let row = result.map_err(|e| {
            AnalysisError::UnsupportedFormat(format!("CSV parse error at line {}: {}", line, e))
        })?;
        records.push(layout.normalize(&row, line)?);
    }

    if records.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }

    log::info!(
        "loaded {} sales rows ({} column set)",
        records.len(),
        column_set
    );
    Ok(SalesDataset::new(column_set, records))
}

/// Load sales records from a CSV file path.
pub fn load_sales_file<P: AsRef<Path>>(
    path: P,
    column_set: ColumnSet,
) -> AnalysisResult<SalesDataset> {
    let path = path.as_ref();
    let upload = match DatasetUpload::from_path(path) {
        Ok(upload) => Some(upload),
        Err(e) => {
            log::warn!("could not read '{}': {}", path.display(), e);
            None
        }
    };
    decode_upload(upload.as_ref(), column_set)
}

/// Parse a date cell. Accepts ISO dates, US month-first dates, and
/// timestamps (the time part is dropped).
pub fn parse_date(raw: &str) -> AnalysisResult<NaiveDate> {
    let value = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .ok_or_else(|| AnalysisError::DateParseFailure(raw.to_string()))
}

/// Header positions of the columns the configured set needs.
struct ColumnLayout {
    column_set: ColumnSet,
    index: HashMap<&'static str, usize>,
}

impl ColumnLayout {
    fn resolve(headers: &csv::StringRecord, column_set: ColumnSet) -> AnalysisResult<Self> {
        let mut index = HashMap::new();
        let mut missing = Vec::new();
        for &name in column_set.required_columns() {
            match headers.iter().position(|h| h == name) {
                Some(i) => {
                    index.insert(name, i);
                }
                None => missing.push(name.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(AnalysisError::MissingColumns(missing));
        }
        Ok(Self { column_set, index })
    }

    fn cell<'r>(&self, row: &'r csv::StringRecord, name: &str) -> &'r str {
        self.index
            .get(name)
            .and_then(|&i| row.get(i))
            .unwrap_or("")
    }

    fn normalize(&self, row: &csv::StringRecord, line: usize) -> AnalysisResult<SalesRecord> {
        let date = parse_date(self.cell(row, columns::DATE))?;
        let units_sold = parse_number(self.cell(row, columns::UNITS_SOLD), columns::UNITS_SOLD, line)?;

        let record = match self.column_set {
            ColumnSet::Catalog => {
                let mut record =
                    SalesRecord::new(date, self.cell(row, columns::PRODUCT_ID), units_sold)
                        .with_category(self.cell(row, columns::CATEGORY));
                record.price = parse_optional_number(self.cell(row, columns::PRICE), columns::PRICE, line)?;
                record
            }
            ColumnSet::Regional => {
                let mut record =
                    SalesRecord::new(date, self.cell(row, columns::PRODUCT_NAME), units_sold)
                        .with_location(self.cell(row, columns::LOCATION));
                record.product_count = parse_optional_number(
                    self.cell(row, columns::PRODUCT_COUNT),
                    columns::PRODUCT_COUNT,
                    line,
                )?;
                record
            }
        };
        Ok(record)
    }
}

fn parse_number(raw: &str, column: &str, line: usize) -> AnalysisResult<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AnalysisError::InvalidNumber {
            column: column.to_string(),
            line,
            value: raw.to_string(),
        })
}

fn parse_optional_number(raw: &str, column: &str, line: usize) -> AnalysisResult<Option<f64>> {
    if raw.is_empty() {
        return Ok(None);
    }
    parse_number(raw, column, line).map(Some)
}
