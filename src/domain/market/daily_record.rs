use crate::domain::market::week_id::WeekId;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// One trading day of a price series.
///
/// Numeric fields are `None` when the source cell was empty or explicitly
/// missing. Missing values are excluded from every aggregate; they are never
/// treated as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub change_pct: Option<f64>,
    pub price: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub open: Option<f64>,
}

impl DailyRecord {
    /// Creates a record carrying only a change percentage
    pub fn new(date: NaiveDate, change_pct: Option<f64>) -> Self {
        Self {
            date,
            change_pct,
            price: None,
            high: None,
            low: None,
            open: None,
        }
    }

    pub fn with_prices(mut self, price: f64, high: f64, low: f64) -> Self {
        self.price = Some(price);
        self.high = Some(high);
        self.low = Some(low);
        self
    }

    pub fn with_open(mut self, open: f64) -> Self {
        self.open = Some(open);
        self
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// Monday through Friday
    pub fn is_trading_weekday(&self) -> bool {
        !matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }

    pub fn week_id(&self) -> WeekId {
        WeekId::from_date(self.date)
    }

    /// High minus low, when both are known
    pub fn range(&self) -> Option<f64> {
        match (self.high, self.low) {
            (Some(high), Some(low)) => Some(high - low),
            _ => None,
        }
    }

    /// Daily range as a percentage of the low
    pub fn range_pct(&self) -> Option<f64> {
        match (self.range(), self.low) {
            (Some(range), Some(low)) if low != 0.0 => Some(range / low * 100.0),
            _ => None,
        }
    }
}

/// Full English weekday name, e.g. "Monday"
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
