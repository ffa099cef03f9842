//! Query adapters and fixture data for tables

pub mod export;
pub mod sources;

use thiserror::Error;
use tokio::task::JoinError;

// Re-exports
pub use export::export_frame_csv;
pub use sources::{load_csv_records, records_from_reader, Envelope, MatchRule, MemoryAdapter};

/// Errors that can occur while loading or exporting fixture data
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Join error: {0}")]
    Join(#[from] JoinError),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => {
                DataError::Io(std::io::Error::new(io_err.kind(), error.to_string()))
            }
            _ => DataError::Csv(error.to_string()),
        }
    }
}
