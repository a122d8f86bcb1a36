//! Result tree of one analysis request.

use crate::application::analysis::calendar::{DayOfWeekStats, MonthlyReport, WeekSummary};
use crate::application::analysis::conditional::{DayTransition, VolatilityReport};
use crate::application::analysis::index_base::IndexBaseRow;
use crate::application::analysis::overview::Overview;
use crate::application::analysis::price_levels::PriceLevelStats;
use crate::application::analysis::range_blocks::RangeBlockSummary;
use crate::domain::patterns::outcome::ConditionalOutcomeStat;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOfWeekReport {
    pub day_stats: Vec<DayOfWeekStats>,
    pub transitions: Vec<DayTransition>,
}

/// Everything computed for one dataset, keyed by analysis category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub overview: Overview,
    /// Most recent week first
    pub weekly: Vec<WeekSummary>,
    pub day_of_week: DayOfWeekReport,
    pub monthly: MonthlyReport,
    pub daily_streak_outcomes: Vec<ConditionalOutcomeStat>,
    pub weekly_streak_outcomes: Vec<ConditionalOutcomeStat>,
    pub volatility: VolatilityReport,
    pub range_blocks: Vec<RangeBlockSummary>,
    pub price_levels: Vec<PriceLevelStats>,
}

impl AnalysisReport {
    pub fn daily_outcome(&self, key: &str) -> Option<&ConditionalOutcomeStat> {
        self.daily_streak_outcomes.iter().find(|s| s.key() == key)
    }

    pub fn weekly_outcome(&self, key: &str) -> Option<&ConditionalOutcomeStat> {
        self.weekly_streak_outcomes.iter().find(|s| s.key() == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeBlockReport {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub block_width: f64,
    pub blocks: Vec<RangeBlockSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexBaseReport {
    pub rows: Vec<IndexBaseRow>,
}
