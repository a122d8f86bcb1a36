use crate::domain::market::daily_record::DailyRecord;
use crate::domain::statistics::accumulator::ChangeAccumulator;
use serde::{Deserialize, Serialize};

const LEVEL_LABELS: [&str; 4] = ["Bottom 25%", "25-50%", "50-75%", "Top 25%"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLevelStats {
    pub level: String,
    pub lower: f64,
    pub upper: f64,
    pub mean_change: Option<f64>,
    pub positive_pct: f64,
    pub negative_pct: f64,
    pub count: usize,
}

/// Splits `[min, max]` of the price into four equal bands and summarizes
/// the daily change inside each.
///
/// Bands are closed on the right; the lowest one also takes `min` itself.
/// Empty bands are omitted, and a series without prices yields nothing.
pub fn analyze_price_levels(records: &[DailyRecord]) -> Vec<PriceLevelStats> {
    let prices: Vec<f64> = records.iter().filter_map(|r| r.price).collect();
    let (Some(min), Some(max)) = (
        prices.iter().copied().reduce(f64::min),
        prices.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };

    let span = max - min;
    let edges = [
        min - 0.01,
        min + span * 0.25,
        min + span * 0.5,
        min + span * 0.75,
        max + 0.01,
    ];

    let mut bands: [ChangeAccumulator; 4] = Default::default();
    for record in records {
        let Some(price) = record.price else { continue };
        let band = edges[1..].iter().position(|upper| price <= *upper).unwrap_or(3);
        bands[band].push(record.change_pct);
    }

    bands
        .iter()
        .enumerate()
        .filter(|(_, acc)| acc.count() > 0)
        .map(|(i, acc)| {
            let stats = acc.summary();
            PriceLevelStats {
                level: LEVEL_LABELS[i].to_string(),
                lower: edges[i],
                upper: edges[i + 1],
                mean_change: stats.mean,
                positive_pct: stats.positive_pct,
                negative_pct: stats.negative_pct,
                count: stats.count,
            }
        })
        .collect()
}
