use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("table load failed for {}: {reason}", .path.display())]
    TableLoad { path: PathBuf, reason: String },

    #[error("column lookup failed: `{column}` is not a column of {table}")]
    ColumnLookup { column: String, table: String },

    #[error("invalid settings: {0}")]
    SettingsValidation(String),

    #[error("invalid partition config: {0}")]
    PartitionConfig(String),

    #[error("failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub fn table_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::TableLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Pipeline stage the error belongs to, used as a prefix in user-facing messages.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::TableLoad { .. } => "load",
            Error::ColumnLookup { .. } => "extract",
            Error::SettingsValidation(_) => "settings",
            Error::PartitionConfig(_) => "partition",
            Error::Output { .. } => "write",
            Error::Io(_) | Error::Csv(_) => "io",
        }
    }
}
