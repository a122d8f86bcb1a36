use crate::domain::market::daily_record::DailyRecord;
use crate::domain::market::week_id::WeekId;
use crate::domain::patterns::range_block::{DateStreak, classify_with_width, consecutive_day_streaks};
use crate::domain::statistics::accumulator::ChangeAccumulator;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Members of one signed change band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeBlockSummary {
    pub block: f64,
    pub count: usize,
    pub avg_change: f64,
    pub weeks: Vec<WeekId>,
    pub streaks: Vec<DateStreak>,
    pub dates: Vec<NaiveDate>,
}

#[derive(Default)]
struct BlockMembers {
    changes: ChangeAccumulator,
    weeks: BTreeSet<WeekId>,
    dates: Vec<NaiveDate>,
}

/// Buckets every present change into bands of `width` and summarizes each.
///
/// Blocks are ordered by magnitude, negative before positive.
pub fn analyze_range_blocks(records: &[DailyRecord], width: f64) -> Vec<RangeBlockSummary> {
    // Blocks are keyed in hundredths; classify already rounds to 2 decimals.
    let mut blocks: BTreeMap<i64, BlockMembers> = BTreeMap::new();

    for record in records {
        let Some(block) = classify_with_width(record.change_pct, width) else {
            continue;
        };
        let members = blocks.entry((block * 100.0).round() as i64).or_default();
        members.changes.push(record.change_pct);
        members.weeks.insert(record.week_id());
        members.dates.push(record.date);
    }

    let mut summaries: Vec<RangeBlockSummary> = blocks
        .into_iter()
        .map(|(key, members)| RangeBlockSummary {
            block: key as f64 / 100.0,
            count: members.changes.count(),
            avg_change: members.changes.mean().unwrap_or(0.0),
            weeks: members.weeks.into_iter().collect(),
            streaks: consecutive_day_streaks(&members.dates),
            dates: members.dates,
        })
        .collect();

    summaries.sort_by(|a, b| {
        a.block
            .abs()
            .total_cmp(&b.block.abs())
            .then(a.block.total_cmp(&b.block))
    });
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patterns::range_block::DEFAULT_BLOCK_WIDTH;

    fn day(d: u32, change: f64) -> DailyRecord {
        DailyRecord::new(NaiveDate::from_ymd_opt(2025, 1, d).unwrap(), Some(change))
    }

    #[test]
    fn test_blocks_sorted_by_magnitude_negative_first() {
        let records = vec![
            day(6, 0.5),
            day(7, -0.2),
            day(8, 0.1),
            day(9, -0.5),
            day(10, 0.25),
        ];
        let blocks = analyze_range_blocks(&records, DEFAULT_BLOCK_WIDTH);
        let order: Vec<f64> = blocks.iter().map(|b| b.block).collect();
        assert_eq!(order, vec![-0.3, 0.3, -0.6, 0.6]);
    }

    #[test]
    fn test_block_membership_and_streaks() {
        let records = vec![
            day(6, 0.1),
            day(7, 0.2),
            day(8, 0.3),
            day(9, 1.0),
            day(10, 0.05),
            day(13, 0.15),
        ];
        let blocks = analyze_range_blocks(&records, DEFAULT_BLOCK_WIDTH);
        let small = &blocks[0];
        assert_eq!(small.block, 0.3);
        assert_eq!(small.count, 5);
        assert!((small.avg_change - 0.16).abs() < 1e-9);
        assert_eq!(small.weeks, vec![WeekId::new(2025, 2), WeekId::new(2025, 3)]);
        // 6-8 consecutive, 10 alone, 13 alone (weekend gap)
        assert_eq!(small.streaks.len(), 1);
        assert_eq!(small.streaks[0].length, 3);

        assert_eq!(blocks[1].block, 1.2);
        assert!(blocks[1].streaks.is_empty());
    }

    #[test]
    fn test_missing_changes_are_skipped() {
        let records = vec![DailyRecord::new(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(), None)];
        assert!(analyze_range_blocks(&records, DEFAULT_BLOCK_WIDTH).is_empty());
    }
}
