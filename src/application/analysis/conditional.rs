//! "What happens next" tables.
//!
//! All lookups walk adjacent pairs of the sorted, weekend-filtered sequence.
//! A condition whose next value is missing contributes no observation.

use crate::domain::market::daily_record::{DailyRecord, weekday_name};
use crate::domain::patterns::outcome::{ConditionalOutcomeStat, OutcomeTally};
use crate::domain::patterns::streak::{StreakKind, detect_streaks};
use crate::domain::statistics::stats::Stats;
use chrono::{Days, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// Outcome of the period following each maximal streak.
///
/// Only a streak's final length is counted, once. Streaks longer than `cap`
/// land in the `cap` bucket. Buckets come back ordered by length, positive
/// before negative, and only when they hold at least one observation.
pub fn streak_outcomes(values: &[Option<f64>], cap: usize) -> Vec<ConditionalOutcomeStat> {
    let cap = cap.max(1);
    let mut buckets: BTreeMap<(usize, StreakKind), OutcomeTally> = BTreeMap::new();

    for streak in detect_streaks(values) {
        let Some(next) = values.get(streak.end_index + 1).copied().and_then(present) else {
            continue;
        };
        buckets
            .entry((streak.length.min(cap), streak.kind))
            .or_default()
            .record(next);
    }

    buckets
        .iter()
        .filter(|(_, tally)| tally.count() > 0)
        .map(|(&(length, kind), tally)| ConditionalOutcomeStat::from_tally(length, kind, tally))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionStat {
    pub count: usize,
    pub prob_positive: f64,
    pub avg_change: f64,
}

impl TransitionStat {
    fn from_tally(tally: &OutcomeTally) -> Option<Self> {
        (tally.count() > 0).then(|| Self {
            count: tally.count(),
            prob_positive: tally.prob_positive(),
            avg_change: tally.avg_next(),
        })
    }
}

/// Next-weekday outcome split by the sign of the current day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTransition {
    pub from: String,
    pub to: String,
    pub after_positive: Option<TransitionStat>,
    pub after_negative: Option<TransitionStat>,
}

impl DayTransition {
    pub fn key(&self) -> String {
        format!("{}_to_{}", self.from, self.to)
    }
}

const TRANSITION_DAYS: [Weekday; 4] = [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu];

/// Mon→Tue through Thu→Fri transitions.
///
/// A pair counts only when the next record is dated the very next calendar
/// day, so a holiday between two records breaks the pair.
pub fn day_transitions(records: &[DailyRecord]) -> Vec<DayTransition> {
    let mut tallies: BTreeMap<u32, (OutcomeTally, OutcomeTally)> = BTreeMap::new();

    for pair in records.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        let weekday = current.weekday();
        if !TRANSITION_DAYS.contains(&weekday) {
            continue;
        }
        if current.date.checked_add_days(Days::new(1)) != Some(next.date) {
            continue;
        }
        let (Some(kind), Some(next_change)) = (
            StreakKind::of(current.change_pct),
            present(next.change_pct),
        ) else {
            continue;
        };

        let entry = tallies.entry(weekday.num_days_from_monday()).or_default();
        match kind {
            StreakKind::Positive => entry.0.record(next_change),
            StreakKind::Negative => entry.1.record(next_change),
        }
    }

    TRANSITION_DAYS
        .iter()
        .filter_map(|day| {
            let (after_positive, after_negative) = tallies.get(&day.num_days_from_monday())?;
            Some(DayTransition {
                from: weekday_name(*day).to_string(),
                to: weekday_name(day.succ()).to_string(),
                after_positive: TransitionStat::from_tally(after_positive),
                after_negative: TransitionStat::from_tally(after_negative),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityClustering {
    pub threshold: f64,
    pub prob_high_vol_after_high_vol: f64,
    pub high_vol_days_count: usize,
    pub consecutive_high_vol_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AfterHighVolatility {
    pub prob_positive: f64,
    pub prob_negative: f64,
    pub avg_positive_change: f64,
    pub avg_negative_change: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolatilityReport {
    pub clustering: Option<VolatilityClustering>,
    pub after_high_volatility: Option<AfterHighVolatility>,
}

/// Volatility clustering around the `quantile` of absolute changes.
///
/// A day is high-volatility when its absolute change is strictly above the
/// threshold. Missing days are neither high nor low.
pub fn volatility_clustering(records: &[DailyRecord], quantile: f64) -> VolatilityReport {
    let magnitudes: Vec<f64> = records
        .iter()
        .filter_map(|r| present(r.change_pct))
        .map(f64::abs)
        .collect();
    let Some(threshold) = Stats::quantile(&magnitudes, quantile) else {
        return VolatilityReport::default();
    };

    let is_high = |value: Option<f64>| present(value).is_some_and(|v| v.abs() > threshold);

    let high_days = records.iter().filter(|r| is_high(r.change_pct)).count();
    if high_days == 0 {
        return VolatilityReport::default();
    }

    let mut consecutive = 0;
    let mut gains = Vec::new();
    let mut losses = Vec::new();
    for pair in records.windows(2) {
        if !is_high(pair[0].change_pct) {
            continue;
        }
        if is_high(pair[1].change_pct) {
            consecutive += 1;
        }
        match present(pair[1].change_pct) {
            Some(next) if next > 0.0 => gains.push(next),
            Some(next) if next < 0.0 => losses.push(next),
            _ => {}
        }
    }

    let directional = gains.len() + losses.len();
    let after_high_volatility = (directional > 0).then(|| AfterHighVolatility {
        prob_positive: Stats::percent(gains.len(), directional),
        prob_negative: Stats::percent(losses.len(), directional),
        avg_positive_change: Stats::mean_or_zero(&gains),
        avg_negative_change: Stats::mean_or_zero(&losses),
    });

    VolatilityReport {
        clustering: Some(VolatilityClustering {
            threshold,
            prob_high_vol_after_high_vol: Stats::percent(consecutive, high_days),
            high_vol_days_count: high_days,
            consecutive_high_vol_count: consecutive,
        }),
        after_high_volatility,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(m: u32, d: u32, change: f64) -> DailyRecord {
        DailyRecord::new(NaiveDate::from_ymd_opt(2025, m, d).unwrap(), Some(change))
    }

    #[test]
    fn test_two_day_rise_then_fall() {
        let values = [Some(1.0), Some(1.0), Some(-1.0)];
        let stats = streak_outcomes(&values, 5);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].key(), "2_positive");
        assert_eq!(stats[0].count, 1);
        assert_eq!(stats[0].avg_next_change, -1.0);
        assert_eq!(stats[0].prob_next_negative, 100.0);
    }

    #[test]
    fn test_long_streaks_fold_into_cap() {
        let values = [
            Some(1.0),
            Some(1.0),
            Some(1.0),
            Some(1.0),
            Some(1.0),
            Some(1.0),
            Some(1.0),
            Some(-2.0),
            Some(3.0),
        ];
        let stats = streak_outcomes(&values, 5);
        let keys: Vec<String> = stats.iter().map(|s| s.key()).collect();
        assert_eq!(keys, vec!["1_negative", "5_positive"]);
        assert_eq!(stats[1].count, 1);
        assert_eq!(stats[1].avg_next_change, -2.0);
    }

    #[test]
    fn test_zero_next_counts_in_neither_direction() {
        let values = [Some(-1.0), Some(0.0), Some(2.0), Some(-1.0)];
        let stats = streak_outcomes(&values, 5);
        let after_negative = &stats[1];
        assert_eq!(after_negative.key(), "1_negative");
        assert_eq!(after_negative.count, 1);
        assert_eq!(after_negative.prob_next_positive, 0.0);
        assert_eq!(after_negative.prob_next_negative, 0.0);
        assert_eq!(stats[0].key(), "1_positive");
    }

    #[test]
    fn test_missing_next_value_is_not_observed() {
        let values = [Some(1.0), None, Some(1.0)];
        assert!(streak_outcomes(&values, 5).is_empty());
    }

    #[test]
    fn test_transitions_need_calendar_adjacency() {
        // Mon 6th, Wed 8th (Tuesday holiday), Thu 9th
        let records = vec![day(1, 6, 1.0), day(1, 8, -1.0), day(1, 9, 2.0)];
        let transitions = day_transitions(&records);
        assert_eq!(transitions.len(), 1);
        let wed = &transitions[0];
        assert_eq!(wed.key(), "Wednesday_to_Thursday");
        assert!(wed.after_positive.is_none());
        let stat = wed.after_negative.unwrap();
        assert_eq!(stat.count, 1);
        assert_eq!(stat.prob_positive, 100.0);
        assert_eq!(stat.avg_change, 2.0);
    }

    #[test]
    fn test_friday_to_monday_is_not_a_transition() {
        let records = vec![day(1, 10, 1.0), day(1, 13, 1.0)];
        assert!(day_transitions(&records).is_empty());
    }

    #[test]
    fn test_volatility_clustering() {
        // |changes| = 0.1, 0.2, 3, 4, 0.1, 5, -> q75 = 3.75
        let records = vec![
            day(1, 6, 0.1),
            day(1, 7, -0.2),
            day(1, 8, 3.0),
            day(1, 9, -4.0),
            day(1, 10, 0.1),
            day(1, 13, 5.0),
        ];
        let report = volatility_clustering(&records, 0.75);
        let clustering = report.clustering.unwrap();
        assert!((clustering.threshold - 3.75).abs() < 1e-9);
        assert_eq!(clustering.high_vol_days_count, 2);
        assert_eq!(clustering.consecutive_high_vol_count, 0);
        assert_eq!(clustering.prob_high_vol_after_high_vol, 0.0);

        let after = report.after_high_volatility.unwrap();
        assert_eq!(after.prob_positive, 100.0);
        assert_eq!(after.avg_positive_change, 0.1);
        assert_eq!(after.avg_negative_change, 0.0);
    }

    #[test]
    fn test_flat_series_has_no_high_volatility() {
        let records = vec![day(1, 6, 1.0), day(1, 7, 1.0)];
        assert_eq!(volatility_clustering(&records, 0.75), VolatilityReport::default());
    }
}
