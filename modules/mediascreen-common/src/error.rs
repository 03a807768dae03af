use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScreeningError>;

/// Failures that abort a whole run. Everything per-query or per-candidate is
/// recovered locally and never surfaces here.
#[derive(Error, Debug)]
pub enum ScreeningError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: String },

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
