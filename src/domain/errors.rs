use thiserror::Error;

/// Errors raised while turning an input table into records or analysing them
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Required column not found: '{column}'")]
    MissingColumn { column: String },

    #[error("No valid data: {reason}")]
    EmptyData { reason: String },

    #[error("Cannot parse {column} on row {row}: '{value}'")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub fn missing_column(column: &str) -> Self {
        AnalysisError::MissingColumn {
            column: column.to_string(),
        }
    }

    pub fn empty(reason: &str) -> Self {
        AnalysisError::EmptyData {
            reason: reason.to_string(),
        }
    }
}
