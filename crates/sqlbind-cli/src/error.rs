//! Error types for the command-line front end.

use std::path::PathBuf;

/// Errors raised while loading configuration or validating statements.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Reading or writing a file failed.
    #[error("IO error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration or schema file is not valid JSON for its type.
    #[error("Failed to parse '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Neither `schema` nor `schemaPath` was configured.
    #[error("Configuration has no 'schema' or 'schemaPath'")]
    MissingSchema,

    /// A `sql` entry is malformed.
    #[error("Invalid sql entry #{index}: {message}")]
    InvalidEntry { index: usize, message: String },

    /// Database error from the SQL validator.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The validator could not start its runtime.
    #[error("Runtime error: {0}")]
    Runtime(#[source] std::io::Error),

    /// Statement analysis failed.
    #[error(transparent)]
    Generation(#[from] sqlbind_core::Error),
}

/// Result type for front-end operations.
pub type Result<T> = std::result::Result<T, CliError>;
