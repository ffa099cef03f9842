//! Error types for table state and query handling

use thiserror::Error;

/// Errors that can surface from a table or its query adapter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// Transport-level failure reported by the adapter (network, timeout, ...)
    #[error("Adapter error: {0}")]
    Adapter(String),

    /// The backend answered but reported one or more GraphQL errors
    #[error("GraphQL error: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    /// The response did not contain the queried object
    #[error("Response has no '{0}' object")]
    MissingObject(String),

    /// A row or envelope field could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Requested page size is not one of the allowed options
    #[error("Page size {size} is not one of {allowed:?}")]
    InvalidPageSize { size: usize, allowed: Vec<usize> },
}

pub type Result<T, E = GridError> = std::result::Result<T, E>;
