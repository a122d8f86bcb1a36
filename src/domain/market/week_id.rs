use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO-8601 week identity.
///
/// Weeks are keyed by the ISO week-numbering year, not the calendar year, so
/// Monday 2024-12-30 belongs to `2025-W01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeekId {
    pub year: i32,
    pub week: u32,
}

impl WeekId {
    pub fn new(year: i32, week: u32) -> Self {
        Self { year, week }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_boundary_uses_iso_year() {
        // Mon 2024-12-30 .. Fri 2025-01-03 is ISO week 1 of 2025
        for day in [date(2024, 12, 30), date(2024, 12, 31), date(2025, 1, 3)] {
            assert_eq!(WeekId::from_date(day), WeekId::new(2025, 1));
        }
    }

    #[test]
    fn test_late_december_can_stay_in_week_53() {
        // 2020 has 53 ISO weeks; Fri 2021-01-01 still belongs to 2020-W53
        assert_eq!(WeekId::from_date(date(2021, 1, 1)), WeekId::new(2020, 53));
    }

    #[test]
    fn test_ordering_is_chronological() {
        let mut ids = vec![
            WeekId::new(2025, 1),
            WeekId::new(2024, 52),
            WeekId::new(2024, 3),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![WeekId::new(2024, 3), WeekId::new(2024, 52), WeekId::new(2025, 1)]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(WeekId::new(2025, 1).to_string(), "2025-W01");
    }
}
