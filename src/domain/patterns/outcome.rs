use crate::domain::patterns::streak::StreakKind;
use crate::domain::statistics::stats::Stats;
use serde::{Deserialize, Serialize};

/// Collects the values observed right after some condition held
#[derive(Debug, Clone, Default)]
pub struct OutcomeTally {
    next_values: Vec<f64>,
    positive: usize,
    negative: usize,
}

impl OutcomeTally {
    pub fn record(&mut self, next_value: f64) {
        self.next_values.push(next_value);
        if next_value > 0.0 {
            self.positive += 1;
        } else if next_value < 0.0 {
            self.negative += 1;
        }
    }

    pub fn count(&self) -> usize {
        self.next_values.len()
    }

    /// Share of observations followed by a rise. Flat next values count in
    /// the denominator only.
    pub fn prob_positive(&self) -> f64 {
        Stats::percent(self.positive, self.count())
    }

    pub fn prob_negative(&self) -> f64 {
        Stats::percent(self.negative, self.count())
    }

    pub fn avg_next(&self) -> f64 {
        Stats::mean_or_zero(&self.next_values)
    }
}

/// What followed a maximal streak of a given length and direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalOutcomeStat {
    pub length: usize,
    pub kind: StreakKind,
    pub count: usize,
    pub prob_next_positive: f64,
    pub prob_next_negative: f64,
    pub avg_next_change: f64,
}

impl ConditionalOutcomeStat {
    pub fn from_tally(length: usize, kind: StreakKind, tally: &OutcomeTally) -> Self {
        Self {
            length,
            kind,
            count: tally.count(),
            prob_next_positive: tally.prob_positive(),
            prob_next_negative: tally.prob_negative(),
            avg_next_change: tally.avg_next(),
        }
    }

    /// Bucket label such as `2_positive`
    pub fn key(&self) -> String {
        format!("{}_{}", self.length, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_outcomes_stay_out_of_both_probabilities() {
        let mut tally = OutcomeTally::default();
        tally.record(1.0);
        tally.record(0.0);
        tally.record(-2.0);
        tally.record(0.0);

        assert_eq!(tally.count(), 4);
        assert_eq!(tally.prob_positive(), 25.0);
        assert_eq!(tally.prob_negative(), 25.0);
        assert_eq!(tally.avg_next(), -0.25);
    }

    #[test]
    fn test_key_format() {
        let mut tally = OutcomeTally::default();
        tally.record(-1.0);
        let stat = ConditionalOutcomeStat::from_tally(2, StreakKind::Positive, &tally);
        assert_eq!(stat.key(), "2_positive");
        assert_eq!(stat.prob_next_negative, 100.0);
    }
}
