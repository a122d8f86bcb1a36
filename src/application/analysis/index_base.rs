//! Primary dataset versus an index-base dataset.

use crate::domain::market::daily_record::DailyRecord;
use crate::domain::statistics::stats::Stats;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One index-base row with its derived percentages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexBaseRow {
    pub date: NaiveDate,
    pub primary_open: Option<f64>,
    pub open: Option<f64>,
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub price: Option<f64>,
    pub since_low: Option<f64>,
    pub since_high: Option<f64>,
    pub alt_open: Option<f64>,
    pub price_vs_open: Option<f64>,
}

/// `(value - base) / base * 100`, 0 when the base is 0
fn pct_from(value: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        Stats::round2((value - base) / base * 100.0)
    }
}

/// Difference of the whole-number opens as a share of the index open
fn alt_open(index_open: f64, primary_open: f64) -> Option<f64> {
    let index_int = index_open.trunc();
    let primary_int = primary_open.trunc();
    (index_int > 0.0).then(|| Stats::round2((index_int - primary_int) / index_int * 100.0))
}

/// Compares `index` rows, in their own order, with `primary` opens on the
/// same date. The first primary row wins when a date repeats.
pub fn compare(primary: &[DailyRecord], index: &[DailyRecord]) -> Vec<IndexBaseRow> {
    let mut primary_opens: HashMap<NaiveDate, Option<f64>> = HashMap::new();
    for record in primary {
        primary_opens.entry(record.date).or_insert(record.open);
    }

    index
        .iter()
        .map(|row| {
            let primary_open = primary_opens.get(&row.date).copied().flatten();
            let since = |bound: Option<f64>| Some(pct_from(row.price?, bound?));

            IndexBaseRow {
                date: row.date,
                primary_open,
                open: row.open,
                low: row.low,
                high: row.high,
                price: row.price,
                since_low: since(row.low),
                since_high: since(row.high),
                alt_open: match (row.open, primary_open) {
                    (Some(index_open), Some(primary_open)) if index_open != 0.0 => {
                        alt_open(index_open, primary_open)
                    }
                    _ => None,
                },
                price_vs_open: match (row.price, row.open) {
                    (Some(price), Some(open)) if open != 0.0 => Some(pct_from(price, open)),
                    _ => None,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn index_row(d: u32, open: f64, low: f64, high: f64, price: f64) -> DailyRecord {
        DailyRecord::new(date(d), None)
            .with_prices(price, high, low)
            .with_open(open)
    }

    #[test]
    fn test_alt_open_uses_whole_numbers() {
        let primary = vec![DailyRecord::new(date(6), None).with_open(41363.9)];
        let index = vec![index_row(6, 41097.2, 41000.0, 41500.0, 41250.0)];
        let rows = compare(&primary, &index);
        assert_eq!(rows[0].primary_open, Some(41363.9));
        assert_eq!(rows[0].alt_open, Some(-0.65));
    }

    #[test]
    fn test_since_low_and_high() {
        let index = vec![index_row(6, 100.0, 95.0, 110.0, 104.5)];
        let row = &compare(&[], &index)[0];
        assert_eq!(row.since_low, Some(10.0));
        assert_eq!(row.since_high, Some(-5.0));
        assert_eq!(row.price_vs_open, Some(4.5));
        assert_eq!(row.primary_open, None);
        assert_eq!(row.alt_open, None);
    }

    #[test]
    fn test_zero_bounds() {
        let index = vec![index_row(6, 0.0, 0.0, 0.0, 5.0)];
        let row = &compare(&[], &index)[0];
        assert_eq!(row.since_low, Some(0.0));
        assert_eq!(row.since_high, Some(0.0));
        assert_eq!(row.price_vs_open, None);
    }

    #[test]
    fn test_keeps_index_order() {
        let index = vec![
            index_row(8, 1.0, 1.0, 1.0, 1.0),
            index_row(6, 1.0, 1.0, 1.0, 1.0),
        ];
        let dates: Vec<NaiveDate> = compare(&[], &index).iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(8), date(6)]);
    }
}
