use statrs::statistics::{Data, Distribution, Median};

/// Shared descriptive statistics over plain `f64` samples.
///
/// Every function returns `None` (or a documented default) for samples that
/// are too small, instead of propagating NaN into reports.
pub struct Stats;

impl Stats {
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Data::new(values.to_vec()).mean()
    }

    /// Mean of the sample, or 0.0 when it is empty.
    ///
    /// Used for average gain/loss where an empty subset is defined as zero.
    pub fn mean_or_zero(values: &[f64]) -> f64 {
        Self::mean(values).unwrap_or(0.0)
    }

    pub fn median(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(Data::new(values.to_vec()).median())
    }

    /// Sample standard deviation (n - 1 denominator)
    pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
        if values.len() < 2 {
            return None;
        }
        Data::new(values.to_vec()).std_dev()
    }

    /// Quantile with linear interpolation between the two nearest order
    /// statistics: position `q * (n - 1)` in the sorted sample.
    pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
        if values.is_empty() || !(0.0..=1.0).contains(&q) {
            return None;
        }

        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let position = q * (sorted.len() - 1) as f64;
        let lower = position.floor() as usize;
        let upper = position.ceil() as usize;
        let fraction = position - lower as f64;

        Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
    }

    /// `part / total * 100`, 0.0 for an empty total
    pub fn percent(part: usize, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        part as f64 / total as f64 * 100.0
    }

    pub fn round2(value: f64) -> f64 {
        (value * 100.0).round() / 100.0
    }
}
