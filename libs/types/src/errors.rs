//! Error types for the query paths
//!
//! Authentication failures live at the HTTP edge; everything a query can
//! report once a caller is authenticated is defined here.

use thiserror::Error;

/// Failure reported by a storage or query operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The load (after filtering) produced no records.
    #[error("{0}")]
    NotFound(String),

    /// A request parameter was rejected before any storage access.
    #[error("Invalid parameter `{field}`: {reason}")]
    Validation { field: String, reason: String },

    /// Unexpected I/O or parse fault; the cause text is preserved.
    #[error("Error loading data: {message}")]
    Storage { message: String },
}

impl QueryError {
    pub fn not_found_ticker(ticker: &str) -> Self {
        Self::NotFound(format!("No data found for ticker {}", ticker))
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for QueryError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err.to_string())
    }
}
