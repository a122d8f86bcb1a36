use crate::domain::statistics::stats::Stats;
use serde::{Deserialize, Serialize};

/// Single-pass accumulator over daily change percentages.
///
/// Missing and NaN values are skipped entirely, so they never enter a
/// denominator.
#[derive(Debug, Clone, Default)]
pub struct ChangeAccumulator {
    values: Vec<f64>,
    gains: Vec<f64>,
    losses: Vec<f64>,
}

impl ChangeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Option<f64>) {
        let Some(value) = value.filter(|v| !v.is_nan()) else {
            return;
        };
        self.values.push(value);
        if value > 0.0 {
            self.gains.push(value);
        } else if value < 0.0 {
            self.losses.push(value);
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn positive_count(&self) -> usize {
        self.gains.len()
    }

    pub fn negative_count(&self) -> usize {
        self.losses.len()
    }

    pub fn neutral_count(&self) -> usize {
        self.count() - self.positive_count() - self.negative_count()
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn mean(&self) -> Option<f64> {
        Stats::mean(&self.values)
    }

    /// Mean of the positive subset, 0.0 when there is none
    pub fn avg_gain(&self) -> f64 {
        Stats::mean_or_zero(&self.gains)
    }

    /// Mean of the negative subset, 0.0 when there is none
    pub fn avg_loss(&self) -> f64 {
        Stats::mean_or_zero(&self.losses)
    }

    pub fn summary(&self) -> BucketStats {
        BucketStats {
            count: self.count(),
            mean: self.mean(),
            positive_count: self.positive_count(),
            negative_count: self.negative_count(),
            positive_pct: Stats::percent(self.positive_count(), self.count()),
            negative_pct: Stats::percent(self.negative_count(), self.count()),
            avg_gain: self.avg_gain(),
            avg_loss: self.avg_loss(),
        }
    }
}

impl FromIterator<Option<f64>> for ChangeAccumulator {
    fn from_iter<I: IntoIterator<Item = Option<f64>>>(iter: I) -> Self {
        let mut acc = ChangeAccumulator::new();
        for value in iter {
            acc.push(value);
        }
        acc
    }
}

/// Descriptive statistics shared by every calendar bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub positive_count: usize,
    pub negative_count: usize,
    pub positive_pct: f64,
    pub negative_pct: f64,
    pub avg_gain: f64,
    pub avg_loss: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avg_gain_is_zero_without_positive_days() {
        let acc: ChangeAccumulator = [Some(-1.0), Some(-2.0), Some(-3.0)].into_iter().collect();
        let stats = acc.summary();
        assert_eq!(stats.avg_gain, 0.0);
        assert_eq!(stats.avg_loss, -2.0);
        assert_eq!(stats.mean, Some(-2.0));
        assert_eq!(stats.negative_pct, 100.0);
    }

    #[test]
    fn test_missing_values_are_excluded_from_denominators() {
        let acc: ChangeAccumulator = [Some(1.0), None, Some(f64::NAN), Some(-1.0), Some(0.0)]
            .into_iter()
            .collect();
        assert_eq!(acc.count(), 3);
        assert_eq!(acc.neutral_count(), 1);
        assert!((acc.summary().positive_pct - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(acc.sum(), 0.0);
    }

    #[test]
    fn test_empty_accumulator() {
        let stats = ChangeAccumulator::new().summary();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.avg_loss, 0.0);
        assert_eq!(stats.positive_pct, 0.0);
    }
}
