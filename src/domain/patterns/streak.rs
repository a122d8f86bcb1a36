use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a same-signed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakKind {
    Positive,
    Negative,
}

impl StreakKind {
    /// Classifies a value. Zero, missing and NaN values have no direction.
    pub fn of(value: Option<f64>) -> Option<Self> {
        match value {
            Some(v) if v > 0.0 => Some(StreakKind::Positive),
            Some(v) if v < 0.0 => Some(StreakKind::Negative),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreakKind::Positive => "positive",
            StreakKind::Negative => "negative",
        }
    }
}

impl fmt::Display for StreakKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A maximal run of same-signed values, with inclusive indices into the
/// scanned sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub kind: StreakKind,
    pub length: usize,
    pub start_index: usize,
    pub end_index: usize,
}

impl Streak {
    fn open(kind: StreakKind, index: usize) -> Self {
        Self {
            kind,
            length: 1,
            start_index: index,
            end_index: index,
        }
    }

    /// Resolves the streak's indices against the dates of the scanned sequence
    pub fn span(&self, dates: &[NaiveDate]) -> Option<StreakSpan> {
        Some(StreakSpan {
            kind: self.kind,
            length: self.length,
            start_date: *dates.get(self.start_index)?,
            end_date: *dates.get(self.end_index)?,
        })
    }
}

/// A streak located in calendar time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSpan {
    pub kind: StreakKind,
    pub length: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Enumerates every maximal same-signed run in one left-to-right pass.
///
/// A zero or missing value closes the current run and belongs to no run.
pub fn detect_streaks(values: &[Option<f64>]) -> Vec<Streak> {
    let mut streaks = Vec::new();
    let mut current: Option<Streak> = None;

    for (index, value) in values.iter().enumerate() {
        let kind = StreakKind::of(*value);

        if let Some(run) = current.as_mut() {
            if Some(run.kind) == kind {
                run.length += 1;
                run.end_index = index;
                continue;
            }
            streaks.extend(current.take());
        }

        if let Some(kind) = kind {
            current = Some(Streak::open(kind, index));
        }
    }

    streaks.extend(current);
    streaks
}

/// Longest streak; on equal length the earliest one wins.
pub fn longest_streak(streaks: &[Streak]) -> Option<Streak> {
    let mut best: Option<Streak> = None;
    for streak in streaks {
        match best {
            Some(current) if streak.length <= current.length => {}
            _ => best = Some(*streak),
        }
    }
    best
}
