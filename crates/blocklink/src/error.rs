//! Error types for the blocklink library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for blocklink operations.
#[derive(Debug, Error)]
pub enum BlockingError {
    /// A variable definition is structurally invalid for its declared type.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An interaction references a variable that is not in the model.
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// An interaction (directly or indirectly) references itself.
    #[error("Cyclic interaction: {}", path.join(" -> "))]
    CyclicInteraction { path: Vec<String> },

    /// A predicate was applied to a value outside its input domain.
    #[error("Predicate {predicate} expects a {expected} value")]
    ValueType {
        predicate: String,
        expected: &'static str,
    },

    /// An index predicate was evaluated without an index service.
    #[error("No index available for {0}")]
    IndexUnavailable(String),

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a data cell.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to block.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for blocklink operations.
pub type Result<T> = std::result::Result<T, BlockingError>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Short tag per variant. Lists every variant.
    fn tag(err: &BlockingError) -> &'static str {
        match err {
            BlockingError::Configuration(_) => "configuration",
            BlockingError::Lookup(_) => "lookup",
            BlockingError::CyclicInteraction { .. } => "cycle",
            BlockingError::ValueType { .. } => "value-type",
            BlockingError::IndexUnavailable(_) => "index",
            BlockingError::Io { .. } => "io",
            BlockingError::Parse { .. } => "parse",
            BlockingError::Csv(_) => "csv",
            BlockingError::EmptyData(_) => "empty",
            BlockingError::Json(_) => "json",
        }
    }

    #[test]
    fn test_error_messages() {
        let err = BlockingError::CyclicInteraction {
            path: vec!["p".to_string(), "q".to_string(), "p".to_string()],
        };
        assert_eq!(tag(&err), "cycle");
        assert_eq!(err.to_string(), "Cyclic interaction: p -> q -> p");

        let err = BlockingError::ValueType {
            predicate: "wholeSetPredicate".to_string(),
            expected: "set",
        };
        assert_eq!(tag(&err), "value-type");
        assert_eq!(err.to_string(), "Predicate wholeSetPredicate expects a set value");
    }

    #[test]
    fn test_json_errors_convert() {
        let err: BlockingError = serde_json::from_str::<Vec<u8>>("{").unwrap_err().into();
        assert_eq!(tag(&err), "json");
        assert!(err.to_string().starts_with("JSON error"));
    }
}
