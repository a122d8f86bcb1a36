//! Calendar aggregation: ISO weeks, weekdays and months.
//!
//! Every grouping is computed over the chronologically sorted sequence.
//! Weekly summaries are handed back most recent first, which is the order
//! reports show them in.

use crate::domain::market::daily_record::{DailyRecord, weekday_name};
use crate::domain::market::week_id::WeekId;
use crate::domain::patterns::streak::{StreakSpan, detect_streaks, longest_streak};
use crate::domain::statistics::accumulator::{BucketStats, ChangeAccumulator};
use crate::domain::statistics::stats::Stats;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

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

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("Unknown")
}

/// Records of one ISO week, in date order
#[derive(Debug, Clone)]
pub struct WeekBucket<'a> {
    pub id: WeekId,
    pub records: Vec<&'a DailyRecord>,
}

impl WeekBucket<'_> {
    /// Sum of the week's daily changes; `None` when every value is missing
    pub fn net_change(&self) -> Option<f64> {
        let acc: ChangeAccumulator = self.records.iter().map(|r| r.change_pct).collect();
        (acc.count() > 0).then(|| acc.sum())
    }
}

/// Groups date-sorted records by ISO week, oldest week first
pub fn group_by_week(records: &[DailyRecord]) -> Vec<WeekBucket<'_>> {
    let mut weeks: BTreeMap<WeekId, Vec<&DailyRecord>> = BTreeMap::new();
    for record in records {
        weeks.entry(record.week_id()).or_default().push(record);
    }
    weeks
        .into_iter()
        .map(|(id, records)| WeekBucket { id, records })
        .collect()
}

/// Chronological weekly net-change series
pub fn weekly_net_changes(records: &[DailyRecord]) -> Vec<(WeekId, Option<f64>)> {
    group_by_week(records)
        .iter()
        .map(|week| (week.id, week.net_change()))
        .collect()
}

/// A value observed on a given day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayValue {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatileDay {
    pub date: NaiveDate,
    pub change_pct: f64,
    pub range: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBreakdown {
    pub date: NaiveDate,
    pub change_pct: Option<f64>,
    pub range: Option<f64>,
    pub range_pct: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
    pub week: WeekId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub trading_days: usize,
    pub neutral_days: usize,
    pub stats: BucketStats,
    pub best_day: Option<DayValue>,
    pub worst_day: Option<DayValue>,
    pub highest_high: Option<DayValue>,
    pub lowest_low: Option<DayValue>,
    pub most_volatile: Option<VolatileDay>,
    pub net_change: f64,
    pub longest_streak: Option<StreakSpan>,
    pub days: Vec<DayBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOfWeekStats {
    pub weekday: String,
    pub stats: BucketStats,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthStats {
    pub month: u32,
    pub name: String,
    pub stats: BucketStats,
    pub median: Option<f64>,
}

/// Net monthly returns of one calendar month, pooled across years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPerformance {
    pub month: u32,
    pub name: String,
    pub avg_monthly_return: f64,
    pub positive_months_pct: f64,
    pub negative_months_pct: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub daily: Vec<MonthStats>,
    pub performance: Vec<MonthlyPerformance>,
}

/// Index of the first occurrence of the extremum picked by `better`
fn first_extreme<F>(values: &[Option<f64>], better: F) -> Option<usize>
where
    F: Fn(f64, f64) -> bool,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, value) in values.iter().enumerate() {
        let Some(v) = value.filter(|v| !v.is_nan()) else {
            continue;
        };
        match best {
            Some((_, current)) if !better(v, current) => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

fn day_value(records: &[&DailyRecord], values: &[Option<f64>], index: Option<usize>) -> Option<DayValue> {
    let i = index?;
    Some(DayValue {
        date: records[i].date,
        value: values[i]?,
    })
}

pub struct CalendarAggregator;

impl CalendarAggregator {
    pub fn summarize_week(week: &WeekBucket<'_>) -> Option<WeekSummary> {
        let records = &week.records;
        let first = records.first()?;
        let last = records.last()?;

        let changes: Vec<Option<f64>> = records.iter().map(|r| r.change_pct).collect();
        let highs: Vec<Option<f64>> = records.iter().map(|r| r.high).collect();
        let lows: Vec<Option<f64>> = records.iter().map(|r| r.low).collect();
        let magnitudes: Vec<Option<f64>> = changes.iter().map(|c| c.map(f64::abs)).collect();
        let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();

        let acc: ChangeAccumulator = changes.iter().copied().collect();

        let most_volatile = first_extreme(&magnitudes, |a, b| a > b).and_then(|i| {
            Some(VolatileDay {
                date: records[i].date,
                change_pct: changes[i]?,
                range: records[i].range(),
            })
        });

        let longest_streak = longest_streak(&detect_streaks(&changes)).and_then(|s| s.span(&dates));

        Some(WeekSummary {
            week: week.id,
            start_date: first.date,
            end_date: last.date,
            trading_days: records.len(),
            neutral_days: acc.neutral_count(),
            stats: acc.summary(),
            best_day: day_value(records, &changes, first_extreme(&changes, |a, b| a > b)),
            worst_day: day_value(records, &changes, first_extreme(&changes, |a, b| a < b)),
            highest_high: day_value(records, &highs, first_extreme(&highs, |a, b| a > b)),
            lowest_low: day_value(records, &lows, first_extreme(&lows, |a, b| a < b)),
            most_volatile,
            net_change: acc.sum(),
            longest_streak,
            days: records
                .iter()
                .map(|r| DayBreakdown {
                    date: r.date,
                    change_pct: r.change_pct,
                    range: r.range(),
                    range_pct: r.range_pct(),
                    high: r.high,
                    low: r.low,
                })
                .collect(),
        })
    }

    /// Per-week summaries, most recent week first
    pub fn weekly(records: &[DailyRecord]) -> Vec<WeekSummary> {
        let mut summaries: Vec<WeekSummary> = group_by_week(records)
            .iter()
            .filter_map(Self::summarize_week)
            .collect();
        summaries.reverse();
        summaries
    }

    pub fn day_of_week(records: &[DailyRecord]) -> Vec<DayOfWeekStats> {
        let mut by_day: BTreeMap<u32, (chrono::Weekday, ChangeAccumulator)> = BTreeMap::new();
        for record in records {
            let day = record.weekday();
            by_day
                .entry(day.num_days_from_monday())
                .or_insert_with(|| (day, ChangeAccumulator::new()))
                .1
                .push(record.change_pct);
        }

        by_day
            .into_values()
            .map(|(day, acc)| DayOfWeekStats {
                weekday: weekday_name(day).to_string(),
                stats: acc.summary(),
                median: Stats::median(acc.values()),
                std_dev: Stats::sample_std_dev(acc.values()),
            })
            .collect()
    }

    pub fn monthly(records: &[DailyRecord]) -> MonthlyReport {
        let mut by_month: BTreeMap<u32, ChangeAccumulator> = BTreeMap::new();
        let mut by_year_month: BTreeMap<(i32, u32), ChangeAccumulator> = BTreeMap::new();

        for record in records {
            let key = (record.date.year(), record.date.month());
            by_month.entry(key.1).or_default().push(record.change_pct);
            by_year_month.entry(key).or_default().push(record.change_pct);
        }

        let daily = by_month
            .iter()
            .filter(|(_, acc)| acc.count() > 0)
            .map(|(&month, acc)| MonthStats {
                month,
                name: month_name(month).to_string(),
                stats: acc.summary(),
                median: Stats::median(acc.values()),
            })
            .collect();

        let mut returns_by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for ((_, month), acc) in &by_year_month {
            if acc.count() > 0 {
                returns_by_month.entry(*month).or_default().push(acc.sum());
            }
        }

        let performance = returns_by_month
            .into_iter()
            .map(|(month, returns)| {
                let positive = returns.iter().filter(|r| **r > 0.0).count();
                let negative = returns.iter().filter(|r| **r < 0.0).count();
                MonthlyPerformance {
                    month,
                    name: month_name(month).to_string(),
                    avg_monthly_return: Stats::mean_or_zero(&returns),
                    positive_months_pct: Stats::percent(positive, returns.len()),
                    negative_months_pct: Stats::percent(negative, returns.len()),
                    count: returns.len(),
                }
            })
            .collect();

        MonthlyReport { daily, performance }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32, change: f64) -> DailyRecord {
        DailyRecord::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), Some(change))
    }

    #[test]
    fn test_weeks_across_year_boundary() {
        let records = vec![
            day(2024, 12, 27, 0.5), // Fri, 2024-W52
            day(2024, 12, 30, 1.0), // Mon, 2025-W01
            day(2024, 12, 31, -0.5),
            day(2025, 1, 2, 0.25),
        ];
        let weeks = group_by_week(&records);
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].id, WeekId::new(2024, 52));
        assert_eq!(weeks[1].id, WeekId::new(2025, 1));
        assert_eq!(weeks[1].records.len(), 3);
        assert_eq!(weeks[1].net_change(), Some(0.75));
    }

    #[test]
    fn test_week_summary_extremes_take_first_occurrence() {
        let records = vec![
            day(2025, 1, 6, 1.0).with_prices(10.0, 12.0, 9.0),
            day(2025, 1, 7, -2.0).with_prices(10.0, 12.0, 8.0),
            day(2025, 1, 8, 2.0).with_prices(10.0, 11.0, 8.0),
            day(2025, 1, 9, -2.0).with_prices(10.0, 11.0, 9.5),
            day(2025, 1, 10, 1.0).with_prices(10.0, 11.0, 9.5),
        ];
        let weekly = CalendarAggregator::weekly(&records);
        assert_eq!(weekly.len(), 1);
        let week = &weekly[0];

        let jan = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap();
        assert_eq!(week.best_day, Some(DayValue { date: jan(8), value: 2.0 }));
        assert_eq!(week.worst_day, Some(DayValue { date: jan(7), value: -2.0 }));
        assert_eq!(week.highest_high.unwrap().date, jan(6));
        assert_eq!(week.lowest_low.unwrap().date, jan(7));
        let volatile = week.most_volatile.unwrap();
        assert_eq!(volatile.date, jan(7));
        assert_eq!(volatile.range, Some(4.0));
        assert_eq!(week.net_change, 0.0);
        assert_eq!(week.trading_days, 5);
        assert_eq!(week.stats.positive_count, 3);
        assert_eq!(week.longest_streak.unwrap().length, 1);
        assert_eq!(week.longest_streak.unwrap().start_date, jan(6));
    }

    #[test]
    fn test_weekly_is_reverse_chronological() {
        let records = vec![day(2025, 1, 6, 1.0), day(2025, 1, 13, 1.0), day(2025, 1, 20, 1.0)];
        let weeks: Vec<u32> = CalendarAggregator::weekly(&records)
            .iter()
            .map(|w| w.week.week)
            .collect();
        assert_eq!(weeks, vec![4, 3, 2]);
    }

    #[test]
    fn test_week_without_gains_has_zero_avg_gain() {
        let records = vec![day(2025, 1, 6, -1.0), day(2025, 1, 7, -2.0), day(2025, 1, 8, -3.0)];
        let week = &CalendarAggregator::weekly(&records)[0];
        assert_eq!(week.stats.avg_gain, 0.0);
        assert_eq!(week.stats.avg_loss, -2.0);
        assert_eq!(week.net_change, -6.0);
    }

    #[test]
    fn test_day_of_week_stats() {
        let records = vec![
            day(2025, 1, 6, 1.0),  // Mon
            day(2025, 1, 13, 3.0), // Mon
            day(2025, 1, 14, -1.0), // Tue
        ];
        let stats = CalendarAggregator::day_of_week(&records);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].weekday, "Monday");
        assert_eq!(stats[0].stats.mean, Some(2.0));
        assert_eq!(stats[0].median, Some(2.0));
        assert!(stats[0].std_dev.is_some());
        assert_eq!(stats[1].weekday, "Tuesday");
        assert_eq!(stats[1].std_dev, None);
        assert_eq!(stats[1].stats.avg_gain, 0.0);
    }

    #[test]
    fn test_monthly_performance_pools_years() {
        let records = vec![
            day(2024, 1, 8, 1.0),
            day(2024, 1, 9, 1.0),
            day(2025, 1, 6, -1.0),
            day(2025, 2, 3, 0.5),
        ];
        let report = CalendarAggregator::monthly(&records);
        assert_eq!(report.daily.len(), 2);
        assert_eq!(report.daily[0].name, "January");
        assert_eq!(report.daily[0].stats.count, 3);

        let january = &report.performance[0];
        assert_eq!(january.count, 2);
        assert_eq!(january.avg_monthly_return, 0.5);
        assert_eq!(january.positive_months_pct, 50.0);
        assert_eq!(january.negative_months_pct, 50.0);
        assert_eq!(report.performance[1].name, "February");
    }
}
