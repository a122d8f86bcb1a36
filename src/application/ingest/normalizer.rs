//! Raw table to typed record normalization.
//!
//! Runs exactly once per request, before any analysis: resolves columns,
//! coerces percent and thousands-separated strings, parses dates, drops
//! weekend rows and sorts chronologically.

use crate::domain::errors::AnalysisError;
use crate::domain::market::daily_record::DailyRecord;
use crate::domain::market::raw_table::{RawCell, RawTable};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

pub const DATE_COLUMN: &str = "Date";
pub const CHANGE_COLUMN: &str = "Change %";
pub const PRICE_COLUMN: &str = "Price";
pub const HIGH_COLUMN: &str = "High";
pub const LOW_COLUMN: &str = "Low";
pub const OPEN_COLUMN: &str = "Open";

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%b %d, %Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const MISSING_MARKERS: [&str; 5] = ["-", "—", "nan", "n/a", "null"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumericKind {
    Percent,
    Price,
}

/// Resolved column positions of one table
struct ColumnMap {
    date: usize,
    change: Option<usize>,
    price: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    open: Option<usize>,
}

impl ColumnMap {
    fn resolve(table: &RawTable, required: &[&str]) -> Result<Self, AnalysisError> {
        let index_of = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| AnalysisError::missing_column(name))
        };

        let date = index_of(DATE_COLUMN)?;
        for name in required {
            index_of(*name)?;
        }

        Ok(Self {
            date,
            change: table.column_index(CHANGE_COLUMN),
            price: table.column_index(PRICE_COLUMN),
            high: table.column_index(HIGH_COLUMN),
            low: table.column_index(LOW_COLUMN),
            open: table.column_index(OPEN_COLUMN),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    filter_weekends: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Normalizer {
    pub fn new(filter_weekends: bool) -> Self {
        Self { filter_weekends }
    }

    /// Turns an untyped table into weekday records sorted by date.
    ///
    /// Fails when `Date` or `Change %` is absent, when a cell cannot be
    /// coerced, or when no usable row survives filtering.
    pub fn normalize(&self, table: &RawTable) -> Result<Vec<DailyRecord>, AnalysisError> {
        let records = self.read_rows(table, &[CHANGE_COLUMN])?;
        self.renormalize(records)
    }

    /// Coerces every row in input order, without filtering or sorting.
    ///
    /// `Date` is always required; `required` names the other columns that
    /// must be present.
    pub fn read_rows(&self, table: &RawTable, required: &[&str]) -> Result<Vec<DailyRecord>, AnalysisError> {
        let columns = ColumnMap::resolve(table, required)?;
        let mut records = Vec::with_capacity(table.len());

        for (i, row) in table.rows().iter().enumerate() {
            let row_number = i + 1;
            let cell = |index: usize| row.get(index).unwrap_or(&RawCell::Empty);
            let numeric = |index: Option<usize>, kind: NumericKind, column: &str| -> Result<Option<f64>, AnalysisError> {
                match index {
                    Some(index) => coerce_numeric(cell(index), kind, row_number, column),
                    None => Ok(None),
                }
            };

            records.push(DailyRecord {
                date: coerce_date(cell(columns.date), row_number)?,
                change_pct: numeric(columns.change, NumericKind::Percent, CHANGE_COLUMN)?,
                price: numeric(columns.price, NumericKind::Price, PRICE_COLUMN)?,
                high: numeric(columns.high, NumericKind::Price, HIGH_COLUMN)?,
                low: numeric(columns.low, NumericKind::Price, LOW_COLUMN)?,
                open: numeric(columns.open, NumericKind::Price, OPEN_COLUMN)?,
            });
        }

        Ok(records)
    }

    /// Applies the weekend filter and chronological sort to typed records.
    ///
    /// Idempotent: feeding its own output back returns the same sequence.
    pub fn renormalize(&self, records: Vec<DailyRecord>) -> Result<Vec<DailyRecord>, AnalysisError> {
        let total = records.len();
        let mut records: Vec<DailyRecord> = if self.filter_weekends {
            records.into_iter().filter(|r| r.is_trading_weekday()).collect()
        } else {
            records
        };

        if records.len() < total {
            debug!("Dropped {} weekend rows", total - records.len());
        }

        // Stable: same-date rows keep their input order
        records.sort_by_key(|r| r.date);

        if records.is_empty() {
            return Err(AnalysisError::empty("no weekday rows after filtering"));
        }
        if records.iter().all(|r| r.change_pct.is_none()) {
            warn!("Every '{}' value is missing", CHANGE_COLUMN);
            return Err(AnalysisError::empty("no valid values in the 'Change %' column"));
        }

        Ok(records)
    }
}

fn coerce_numeric(
    cell: &RawCell,
    kind: NumericKind,
    row: usize,
    column: &str,
) -> Result<Option<f64>, AnalysisError> {
    let text = match cell {
        RawCell::Empty => return Ok(None),
        RawCell::Number(value) => return Ok(Some(*value).filter(|v| !v.is_nan())),
        RawCell::Text(text) => text,
    };

    if MISSING_MARKERS.contains(&text.to_ascii_lowercase().as_str()) {
        return Ok(None);
    }

    let cleaned = match kind {
        NumericKind::Percent => text.trim_end_matches('%').trim().to_string(),
        NumericKind::Price => text.replace(',', ""),
    };

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| AnalysisError::Parse {
            row,
            column: column.to_string(),
            value: text.clone(),
        })
}

fn coerce_date(cell: &RawCell, row: usize) -> Result<NaiveDate, AnalysisError> {
    let parse_error = |value: String| AnalysisError::Parse {
        row,
        column: DATE_COLUMN.to_string(),
        value,
    };

    match cell {
        RawCell::Text(text) => parse_date(text).ok_or_else(|| parse_error(text.clone())),
        RawCell::Number(value) => Err(parse_error(value.to_string())),
        RawCell::Empty => Err(parse_error(String::new())),
    }
}

/// Parses the date layouts found in common price-history exports
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}
