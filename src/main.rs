//! Streak and calendar pattern analysis for daily price-history CSV files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use streakscope::application::analysis::engine::PatternEngine;
use streakscope::config::AnalysisConfig;
use streakscope::infrastructure::CsvSource;
use streakscope::interfaces::json_export::export_json;
use streakscope::interfaces::report_formatter::{
    format_analysis, format_index_base, format_range_blocks,
};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Daily change streak and pattern analyzer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every pattern analysis over one CSV file
    Analyze {
        /// Price-history CSV with at least `Date` and `Change %` columns
        csv: PathBuf,

        /// Also write the structured report as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// TOML file overriding analysis settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// Skip the text report on stdout
        #[arg(short, long)]
        quiet: bool,
    },
    /// Show the range-block histogram of daily changes
    Ranges {
        csv: PathBuf,

        #[arg(long)]
        json: Option<PathBuf>,

        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Compare a primary dataset's opens against an index-base dataset
    IndexBase {
        /// CSV with `Date` and `Open`
        primary: PathBuf,

        /// CSV with `Date`, `Open`, `Low`, `High` and `Price`
        index: PathBuf,

        #[arg(long)]
        json: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    let config = AnalysisConfig::from_env()?;
    let config = match path {
        Some(path) => {
            info!("Loading analysis config from: {}", path.display());
            config.with_toml_file(path)?
        }
        None => config,
    };
    Ok(config)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout carries only the report
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            csv,
            json,
            config,
            quiet,
        } => {
            let engine = PatternEngine::new(load_config(config.as_deref())?);
            let table = CsvSource::read_path(&csv)
                .context(format!("Failed to read {}", csv.display()))?;
            let report = engine
                .analyze_table(&table)
                .context(format!("Failed to analyze {}", csv.display()))?;

            if !quiet {
                print!("{}", format_analysis(&report));
            }
            if let Some(path) = json {
                export_json(&report, &path)?;
            }
        }
        Commands::Ranges { csv, json, config } => {
            let engine = PatternEngine::new(load_config(config.as_deref())?);
            let table = CsvSource::read_path(&csv)
                .context(format!("Failed to read {}", csv.display()))?;
            let report = engine
                .range_blocks(&table)
                .context(format!("Failed to classify {}", csv.display()))?;

            print!("{}", format_range_blocks(&report));
            if let Some(path) = json {
                export_json(&report, &path)?;
            }
        }
        Commands::IndexBase {
            primary,
            index,
            json,
        } => {
            let engine = PatternEngine::new(load_config(None)?);
            let primary_table = CsvSource::read_path(&primary)
                .context(format!("Failed to read {}", primary.display()))?;
            let index_table = CsvSource::read_path(&index)
                .context(format!("Failed to read {}", index.display()))?;
            let report = engine
                .index_base(&primary_table, &index_table)
                .context("Failed to compare against the index base")?;

            print!("{}", format_index_base(&report));
            if let Some(path) = json {
                export_json(&report, &path)?;
            }
        }
    }

    Ok(())
}
