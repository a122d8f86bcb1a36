//! Whole-series summary shown at the top of a report.

use crate::application::analysis::calendar::{DayValue, group_by_week};
use crate::domain::market::daily_record::DailyRecord;
use crate::domain::patterns::streak::{Streak, StreakKind, StreakSpan, detect_streaks, longest_streak};
use crate::domain::statistics::accumulator::ChangeAccumulator;
use crate::domain::statistics::stats::Stats;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub trading_days: usize,
    pub positive_days: usize,
    pub negative_days: usize,
    pub neutral_days: usize,
    pub positive_pct: f64,
    pub negative_pct: f64,
    pub neutral_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPatterns {
    pub avg_weekly_range: Option<f64>,
    pub strong_positive_weeks: usize,
    pub weak_positive_weeks: usize,
    pub strong_negative_weeks: usize,
    pub weak_negative_weeks: usize,
    pub consecutive_positive_weeks: usize,
    pub consecutive_negative_weeks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub distribution: Distribution,
    /// `None` when the series has no rising day
    pub avg_positive_change: Option<f64>,
    pub avg_negative_change: Option<f64>,
    pub longest_streak: Option<StreakSpan>,
    pub highest_high: Option<DayValue>,
    pub lowest_low: Option<DayValue>,
    pub avg_daily_range: Option<f64>,
    pub weekly: WeeklyPatterns,
}

/// Number of weeks that extend a same-signed run to two or more
fn extended_weeks(streaks: &[Streak], kind: StreakKind) -> usize {
    streaks
        .iter()
        .filter(|s| s.kind == kind)
        .map(|s| s.length - 1)
        .sum()
}

fn count_where(values: &[f64], pred: impl Fn(f64) -> bool) -> usize {
    values.iter().filter(|v| pred(**v)).count()
}

fn weekly_patterns(records: &[DailyRecord], strong_threshold: f64) -> WeeklyPatterns {
    let weeks = group_by_week(records);

    let ranges: Vec<f64> = weeks
        .iter()
        .filter_map(|week| {
            let high = week.records.iter().filter_map(|r| r.high).reduce(f64::max)?;
            let low = week.records.iter().filter_map(|r| r.low).reduce(f64::min)?;
            Some(high - low)
        })
        .collect();

    let net: Vec<Option<f64>> = weeks.iter().map(|w| w.net_change()).collect();
    let present: Vec<f64> = net.iter().flatten().copied().collect();
    let streaks = detect_streaks(&net);

    WeeklyPatterns {
        avg_weekly_range: Stats::mean(&ranges),
        strong_positive_weeks: count_where(&present, |v| v > strong_threshold),
        weak_positive_weeks: count_where(&present, |v| v > 0.0 && v < strong_threshold),
        strong_negative_weeks: count_where(&present, |v| v < -strong_threshold),
        weak_negative_weeks: count_where(&present, |v| v < 0.0 && v > -strong_threshold),
        consecutive_positive_weeks: extended_weeks(&streaks, StreakKind::Positive),
        consecutive_negative_weeks: extended_weeks(&streaks, StreakKind::Negative),
    }
}

fn extreme_price<F>(records: &[DailyRecord], field: F, higher: bool) -> Option<DayValue>
where
    F: Fn(&DailyRecord) -> Option<f64>,
{
    let mut best: Option<DayValue> = None;
    for record in records {
        let Some(value) = field(record) else { continue };
        let replace = match best {
            None => true,
            Some(current) if higher => value > current.value,
            Some(current) => value < current.value,
        };
        if replace {
            best = Some(DayValue {
                date: record.date,
                value,
            });
        }
    }
    best
}

/// Summarizes date-sorted records; `None` for an empty slice
pub fn summarize(records: &[DailyRecord], strong_week_threshold: f64) -> Option<Overview> {
    let first = records.first()?;
    let last = records.last()?;

    let changes: Vec<Option<f64>> = records.iter().map(|r| r.change_pct).collect();
    let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
    let acc: ChangeAccumulator = changes.iter().copied().collect();
    let days = acc.count();

    let ranges: Vec<f64> = records.iter().filter_map(DailyRecord::range).collect();

    Some(Overview {
        first_date: first.date,
        last_date: last.date,
        distribution: Distribution {
            trading_days: days,
            positive_days: acc.positive_count(),
            negative_days: acc.negative_count(),
            neutral_days: acc.neutral_count(),
            positive_pct: Stats::percent(acc.positive_count(), days),
            negative_pct: Stats::percent(acc.negative_count(), days),
            neutral_pct: Stats::percent(acc.neutral_count(), days),
        },
        avg_positive_change: (acc.positive_count() > 0).then(|| acc.avg_gain()),
        avg_negative_change: (acc.negative_count() > 0).then(|| acc.avg_loss()),
        longest_streak: longest_streak(&detect_streaks(&changes)).and_then(|s| s.span(&dates)),
        highest_high: extreme_price(records, |r| r.high, true),
        lowest_low: extreme_price(records, |r| r.low, false),
        avg_daily_range: Stats::mean(&ranges),
        weekly: weekly_patterns(records, strong_week_threshold),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(m: u32, d: u32, change: f64) -> DailyRecord {
        DailyRecord::new(NaiveDate::from_ymd_opt(2025, m, d).unwrap(), Some(change))
    }

    #[test]
    fn test_distribution_and_longest_streak() {
        let records = vec![
            day(1, 6, 1.0),
            day(1, 7, 1.0),
            day(1, 8, -1.0),
            day(1, 9, -1.0),
            day(1, 10, 0.0),
        ];
        let overview = summarize(&records, 2.0).unwrap();
        assert_eq!(overview.distribution.trading_days, 5);
        assert_eq!(overview.distribution.positive_pct, 40.0);
        assert_eq!(overview.distribution.neutral_days, 1);

        let streak = overview.longest_streak.unwrap();
        assert_eq!(streak.kind, StreakKind::Positive);
        assert_eq!(streak.length, 2);
        assert_eq!(streak.start_date, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        assert_eq!(streak.end_date, NaiveDate::from_ymd_opt(2025, 1, 7).unwrap());
    }

    #[test]
    fn test_average_changes_absent_without_subset() {
        let records = vec![day(1, 6, 1.0), day(1, 7, 3.0)];
        let overview = summarize(&records, 2.0).unwrap();
        assert_eq!(overview.avg_positive_change, Some(2.0));
        assert_eq!(overview.avg_negative_change, None);
        assert_eq!(overview.avg_daily_range, None);
    }

    #[test]
    fn test_price_extremes_first_occurrence() {
        let records = vec![
            day(1, 6, 1.0).with_prices(10.0, 12.0, 9.0),
            day(1, 7, 1.0).with_prices(10.0, 12.0, 9.0),
            day(1, 8, 1.0).with_prices(10.0, 11.0, 8.5),
        ];
        let overview = summarize(&records, 2.0).unwrap();
        assert_eq!(overview.highest_high.unwrap().date, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        assert_eq!(overview.lowest_low.unwrap().value, 8.5);
        assert!((overview.avg_daily_range.unwrap() - 8.5 / 3.0).abs() < 1e-9);
        assert_eq!(overview.weekly.avg_weekly_range, Some(3.5));
    }

    #[test]
    fn test_weekly_patterns() {
        // Week nets: +3, +1, -0.5, -3, -1
        let records = vec![
            day(1, 6, 3.0),
            day(1, 13, 1.0),
            day(1, 20, -0.5),
            day(1, 27, -3.0),
            day(2, 3, -1.0),
        ];
        let weekly = summarize(&records, 2.0).unwrap().weekly;
        assert_eq!(weekly.strong_positive_weeks, 1);
        assert_eq!(weekly.weak_positive_weeks, 1);
        assert_eq!(weekly.strong_negative_weeks, 1);
        assert_eq!(weekly.weak_negative_weeks, 2);
        assert_eq!(weekly.consecutive_positive_weeks, 1);
        assert_eq!(weekly.consecutive_negative_weeks, 2);
    }

    #[test]
    fn test_empty_series() {
        assert!(summarize(&[], 2.0).is_none());
    }
}
