//! Analysis parameter parsing from environment variables and TOML overrides.
//!
//! This module handles loading the tunable constants of the pattern engine:
//! band width, streak caps, volatility quantile and weekly strength threshold.

use crate::domain::patterns::range_block::DEFAULT_BLOCK_WIDTH;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    // Range blocks
    pub range_block_width: f64,

    // Conditional outcomes
    pub daily_streak_cap: usize,
    pub weekly_streak_cap: usize,

    // Volatility clustering
    pub volatility_quantile: f64,

    // Weekly patterns
    pub strong_week_threshold_pct: f64,

    // Normalization
    pub filter_weekends: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            range_block_width: DEFAULT_BLOCK_WIDTH,
            daily_streak_cap: 5,
            weekly_streak_cap: 10,
            volatility_quantile: 0.75,
            strong_week_threshold_pct: 2.0,
            filter_weekends: true,
        }
    }
}

/// Fields a TOML file may override; anything absent keeps its current value
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnalysisOverrides {
    range_block_width: Option<f64>,
    daily_streak_cap: Option<usize>,
    weekly_streak_cap: Option<usize>,
    volatility_quantile: Option<f64>,
    strong_week_threshold_pct: Option<f64>,
    filter_weekends: Option<bool>,
}

impl AnalysisConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            range_block_width: Self::parse_f64(
                "STREAKSCOPE_RANGE_BLOCK_WIDTH",
                defaults.range_block_width,
            )?,
            daily_streak_cap: Self::parse_usize(
                "STREAKSCOPE_DAILY_STREAK_CAP",
                defaults.daily_streak_cap,
            )?,
            weekly_streak_cap: Self::parse_usize(
                "STREAKSCOPE_WEEKLY_STREAK_CAP",
                defaults.weekly_streak_cap,
            )?,
            volatility_quantile: Self::parse_f64(
                "STREAKSCOPE_VOLATILITY_QUANTILE",
                defaults.volatility_quantile,
            )?,
            strong_week_threshold_pct: Self::parse_f64(
                "STREAKSCOPE_STRONG_WEEK_THRESHOLD_PCT",
                defaults.strong_week_threshold_pct,
            )?,
            filter_weekends: Self::parse_bool(
                "STREAKSCOPE_FILTER_WEEKENDS",
                defaults.filter_weekends,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Applies the fields present in a TOML document on top of `self`
    pub fn with_toml_overrides(mut self, content: &str) -> Result<Self> {
        let overrides: AnalysisOverrides =
            toml::from_str(content).context("Failed to parse analysis config TOML")?;

        if let Some(v) = overrides.range_block_width {
            self.range_block_width = v;
        }
        if let Some(v) = overrides.daily_streak_cap {
            self.daily_streak_cap = v;
        }
        if let Some(v) = overrides.weekly_streak_cap {
            self.weekly_streak_cap = v;
        }
        if let Some(v) = overrides.volatility_quantile {
            self.volatility_quantile = v;
        }
        if let Some(v) = overrides.strong_week_threshold_pct {
            self.strong_week_threshold_pct = v;
        }
        if let Some(v) = overrides.filter_weekends {
            self.filter_weekends = v;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn with_toml_file(self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read analysis config file: {}", path.display()))?;
        self.with_toml_overrides(&content)
            .context(format!("Invalid analysis config in {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.range_block_width > 0.0 && self.range_block_width.is_finite(),
            "range_block_width must be a positive number, got {}",
            self.range_block_width
        );
        ensure!(self.daily_streak_cap > 0, "daily_streak_cap must be at least 1");
        ensure!(self.weekly_streak_cap > 0, "weekly_streak_cap must be at least 1");
        ensure!(
            (0.0..=1.0).contains(&self.volatility_quantile),
            "volatility_quantile must be within [0, 1], got {}",
            self.volatility_quantile
        );
        ensure!(
            self.strong_week_threshold_pct >= 0.0,
            "strong_week_threshold_pct must not be negative, got {}",
            self.strong_week_threshold_pct
        );
        Ok(())
    }

    fn parse_f64(key: &str, default: f64) -> Result<f64> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<f64>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_bool(key: &str, default: bool) -> Result<bool> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<bool>()
            .context(format!("Failed to parse {}", key))
    }
}
