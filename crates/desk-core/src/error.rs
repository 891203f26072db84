use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the dashboard.
#[derive(Error, Debug)]
pub enum DeskError {
    /// A required credential or configuration value is absent. Fatal.
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    /// A source table lacks a column the pipeline requires.
    #[error("Source table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    /// A source file could not be opened or read from disk.
    #[error("Failed to read file {}: {}", .path.display(), .source)]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV document could not be parsed.
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The expected data directory does not exist.
    #[error("Data path not found: {}", .0.display())]
    DataPathNotFound(PathBuf),

    /// A completion request against the external text service failed.
    #[error("Completion request failed: {0}")]
    Completion(String),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DeskError>;
