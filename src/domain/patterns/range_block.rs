use crate::domain::market::week_id::WeekId;
use crate::domain::statistics::stats::Stats;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Width of one range band, in percentage points
pub const DEFAULT_BLOCK_WIDTH: f64 = 0.30;

// Fraction of a band under which a magnitude counts as sitting on a boundary.
const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// Assigns a change percentage to its 0.30-wide signed band.
///
/// Values on a band boundary keep it; all others round away from zero to
/// the next boundary. Zero maps to block 0.00.
pub fn classify(change_pct: Option<f64>) -> Option<f64> {
    classify_with_width(change_pct, DEFAULT_BLOCK_WIDTH)
}

pub fn classify_with_width(change_pct: Option<f64>, width: f64) -> Option<f64> {
    let value = change_pct.filter(|v| v.is_finite())?;
    if width <= 0.0 {
        return None;
    }

    let sign = if value >= 0.0 { 1.0 } else { -1.0 };
    let bands = value.abs() / width;
    let nearest = bands.round();

    let band_count = if (bands - nearest).abs() < BOUNDARY_TOLERANCE {
        nearest
    } else {
        bands.floor() + 1.0
    };
    if band_count == 0.0 {
        return Some(0.0);
    }

    Some(Stats::round2(sign * band_count * width))
}

/// Run of calendar-adjacent member dates inside one block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateStreak {
    pub length: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weeks: Vec<WeekId>,
}

/// Finds runs of dates exactly one calendar day apart.
///
/// Only runs of two or more days are returned. Weekends are not bridged:
/// a Friday followed by a Monday is a three-day gap.
pub fn consecutive_day_streaks(dates: &[NaiveDate]) -> Vec<DateStreak> {
    let mut sorted = dates.to_vec();
    sorted.sort();
    sorted.dedup();

    let mut streaks = Vec::new();
    let mut run: Vec<NaiveDate> = Vec::new();

    for date in sorted {
        let continues = run
            .last()
            .map(|prev| (date - *prev).num_days() == 1)
            .unwrap_or(true);
        if !continues {
            streaks.extend(close_run(&run));
            run.clear();
        }
        run.push(date);
    }
    streaks.extend(close_run(&run));

    streaks
}

fn close_run(run: &[NaiveDate]) -> Option<DateStreak> {
    if run.len() < 2 {
        return None;
    }
    let weeks: BTreeSet<WeekId> = run.iter().map(|d| WeekId::from_date(*d)).collect();
    Some(DateStreak {
        length: run.len(),
        start_date: run[0],
        end_date: run[run.len() - 1],
        weeks: weeks.into_iter().collect(),
    })
}
