//! Configuration module for streakscope.
//!
//! Analysis parameters load from environment variables (optionally seeded by a
//! `.env` file in the binary) and may be overridden by a TOML file.

mod analysis_config;

pub use analysis_config::AnalysisConfig;
