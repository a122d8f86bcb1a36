//! Request orchestration.
//!
//! A `PatternEngine` is a pure function of its input: every call normalizes
//! the table once and recomputes every analysis from scratch.

use crate::application::analysis::calendar::{CalendarAggregator, weekly_net_changes};
use crate::application::analysis::conditional::{day_transitions, streak_outcomes, volatility_clustering};
use crate::application::analysis::index_base::compare;
use crate::application::analysis::overview::summarize;
use crate::application::analysis::price_levels::analyze_price_levels;
use crate::application::analysis::range_blocks::analyze_range_blocks;
use crate::application::analysis::report::{
    AnalysisReport, DayOfWeekReport, IndexBaseReport, RangeBlockReport,
};
use crate::application::ingest::normalizer::{
    HIGH_COLUMN, LOW_COLUMN, Normalizer, OPEN_COLUMN, PRICE_COLUMN,
};
use crate::config::AnalysisConfig;
use crate::domain::errors::AnalysisError;
use crate::domain::market::daily_record::DailyRecord;
use crate::domain::market::raw_table::RawTable;
use tracing::{debug, info};

pub struct PatternEngine {
    config: AnalysisConfig,
    normalizer: Normalizer,
}

impl Default for PatternEngine {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl PatternEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        let normalizer = Normalizer::new(config.filter_weekends);
        Self { config, normalizer }
    }

    pub fn analyze_table(&self, table: &RawTable) -> Result<AnalysisReport, AnalysisError> {
        let records = self.normalizer.normalize(table)?;
        self.run(&records)
    }

    /// Analyzes already typed records; they are re-sorted and filtered first
    pub fn analyze_records(&self, records: Vec<DailyRecord>) -> Result<AnalysisReport, AnalysisError> {
        let records = self.normalizer.renormalize(records)?;
        self.run(&records)
    }

    fn run(&self, records: &[DailyRecord]) -> Result<AnalysisReport, AnalysisError> {
        let overview = summarize(records, self.config.strong_week_threshold_pct)
            .ok_or_else(|| AnalysisError::empty("no records to summarize"))?;
        info!(
            "Analyzing {} trading days ({} to {})",
            overview.distribution.trading_days, overview.first_date, overview.last_date
        );

        let daily: Vec<Option<f64>> = records.iter().map(|r| r.change_pct).collect();
        let weekly_series: Vec<Option<f64>> = weekly_net_changes(records)
            .into_iter()
            .map(|(_, net)| net)
            .collect();
        debug!("Weekly series spans {} ISO weeks", weekly_series.len());

        let weekly = CalendarAggregator::weekly(records);
        let day_of_week = DayOfWeekReport {
            day_stats: CalendarAggregator::day_of_week(records),
            transitions: day_transitions(records),
        };
        let monthly = CalendarAggregator::monthly(records);

        let daily_streak_outcomes = streak_outcomes(&daily, self.config.daily_streak_cap);
        let weekly_streak_outcomes = streak_outcomes(&weekly_series, self.config.weekly_streak_cap);
        debug!(
            "Streak outcome buckets: {} daily, {} weekly",
            daily_streak_outcomes.len(),
            weekly_streak_outcomes.len()
        );

        let volatility = volatility_clustering(records, self.config.volatility_quantile);
        if let Some(clustering) = &volatility.clustering {
            debug!(
                "Volatility threshold {:.4} with {} high-volatility days",
                clustering.threshold, clustering.high_vol_days_count
            );
        }

        let range_blocks = analyze_range_blocks(records, self.config.range_block_width);
        let price_levels = analyze_price_levels(records);

        info!(
            "Analysis complete: {} weeks, {} range blocks, {} price levels",
            weekly.len(),
            range_blocks.len(),
            price_levels.len()
        );

        Ok(AnalysisReport {
            overview,
            weekly,
            day_of_week,
            monthly,
            daily_streak_outcomes,
            weekly_streak_outcomes,
            volatility,
            range_blocks,
            price_levels,
        })
    }

    pub fn range_blocks(&self, table: &RawTable) -> Result<RangeBlockReport, AnalysisError> {
        let records = self.normalizer.normalize(table)?;
        let (first, last) = match (records.first(), records.last()) {
            (Some(first), Some(last)) => (first.date, last.date),
            _ => return Err(AnalysisError::empty("no records for range blocks")),
        };

        let blocks = analyze_range_blocks(&records, self.config.range_block_width);
        info!(
            "Classified {} days into {} range blocks of {:.2}%",
            records.len(),
            blocks.len(),
            self.config.range_block_width
        );

        Ok(RangeBlockReport {
            first_date: first,
            last_date: last,
            block_width: self.config.range_block_width,
            blocks,
        })
    }

    /// Index rows are kept in their own order and are not weekend filtered
    pub fn index_base(&self, primary: &RawTable, index: &RawTable) -> Result<IndexBaseReport, AnalysisError> {
        let primary_rows = self.normalizer.read_rows(primary, &[OPEN_COLUMN])?;
        let index_rows = self
            .normalizer
            .read_rows(index, &[OPEN_COLUMN, LOW_COLUMN, HIGH_COLUMN, PRICE_COLUMN])?;

        if index_rows.is_empty() {
            return Err(AnalysisError::empty("index-base dataset has no rows"));
        }

        let rows = compare(&primary_rows, &index_rows);
        let matched = rows.iter().filter(|r| r.primary_open.is_some()).count();
        info!("Compared {} index rows, {} matched a primary open", rows.len(), matched);

        Ok(IndexBaseReport { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::raw_table::RawCell;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        let mut table = RawTable::new(headers);
        for row in rows {
            table.push_row(row.iter().map(|c| RawCell::from_text(c)).collect());
        }
        table
    }

    #[test]
    fn test_rise_rise_fall() {
        let t = table(
            &["Date", "Change %"],
            &[&["2025-01-06", "1%"], &["2025-01-07", "1%"], &["2025-01-08", "-1%"]],
        );
        let report = PatternEngine::default().analyze_table(&t).unwrap();
        let outcome = report.daily_outcome("2_positive").unwrap();
        assert_eq!(outcome.count, 1);
        assert_eq!(outcome.avg_next_change, -1.0);
        assert_eq!(report.daily_streak_outcomes.len(), 1);
        assert_eq!(report.overview.longest_streak.unwrap().length, 2);
    }

    #[test]
    fn test_config_drives_caps() {
        let config = AnalysisConfig {
            daily_streak_cap: 2,
            ..AnalysisConfig::default()
        };
        let t = table(
            &["Date", "Change %"],
            &[
                &["2025-01-06", "1%"],
                &["2025-01-07", "1%"],
                &["2025-01-08", "1%"],
                &["2025-01-09", "-1%"],
            ],
        );
        let report = PatternEngine::new(config).analyze_table(&t).unwrap();
        assert!(report.daily_outcome("2_positive").is_some());
        assert!(report.daily_outcome("3_positive").is_none());
    }

    #[test]
    fn test_index_base_requires_columns() {
        let primary = table(&["Date", "Open"], &[&["2025-01-06", "100"]]);
        let index = table(&["Date", "Open", "Price"], &[&["2025-01-06", "100", "101"]]);
        let err = PatternEngine::default().index_base(&primary, &index).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn { ref column } if column == "Low"));
    }

    #[test]
    fn test_range_block_report_dates() {
        let t = table(
            &["Date", "Change %"],
            &[&["2025-01-08", "0.4%"], &["2025-01-06", "-0.1%"]],
        );
        let report = PatternEngine::default().range_blocks(&t).unwrap();
        assert_eq!(report.first_date.to_string(), "2025-01-06");
        assert_eq!(report.last_date.to_string(), "2025-01-08");
        assert_eq!(report.blocks.len(), 2);
    }
}
