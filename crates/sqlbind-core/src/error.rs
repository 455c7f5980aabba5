//! Error types for statement analysis.

use std::fmt;

use crate::parser::ParseError;
use crate::plan::BatchFailure;

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning a statement into a function.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Tokenizing or parsing failed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A table name the schema does not know.
    #[error("Unknown table '{0}'")]
    UnknownTable(String),

    /// A column the named table does not have.
    #[error("Unknown column '{column}' in table '{table}'")]
    UnknownColumn {
        /// The table that was searched.
        table: String,
        /// The missing column.
        column: String,
    },

    /// An unqualified column exists in both joined tables.
    #[error("Column '{column}' is ambiguous between '{}'", tables.join("' and '"))]
    AmbiguousColumn {
        /// The unqualified column name.
        column: String,
        /// The tables that both have it.
        tables: Vec<String>,
    },

    /// Two result columns scan into the same target.
    #[error("Duplicate result column '{0}'")]
    DuplicateColumnOrAlias(String),

    /// The statement parsed but is not one a function can be generated for.
    #[error("Unsupported statement: {0}")]
    UnsupportedStatementShape(String),

    /// The SQL validator rejected the statement.
    #[error("Invalid SQL '{sql}': {message}")]
    InvalidSql {
        /// The rejected statement.
        sql: String,
        /// The validator's message.
        message: String,
    },

    /// A struct already has a function with this name.
    #[error("Function '{function}' is already defined for '{struct_name}'")]
    DuplicateFunctionName {
        /// The struct the function is filed under.
        struct_name: String,
        /// The clashing function name.
        function: String,
    },

    /// One or more statements of a batch failed.
    #[error("{} statement(s) failed: {}", .0.len(), render_failures(.0))]
    Batch(Vec<BatchFailure>),
}

fn render_failures(failures: &[BatchFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("#{} {}", f.index, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Flat classification of [`Error`] values, independent of the layer that
/// raised them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Tokenize,
    UnexpectedToken,
    UnknownTable,
    UnknownColumn,
    AmbiguousColumn,
    MixedColumnKind,
    DuplicateColumnOrAlias,
    ValueCountMismatch,
    UnsupportedStatementShape,
    InvalidSql,
    DuplicateFunctionName,
    Batch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Error {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(err) => match err {
                ParseError::UnterminatedLiteral { .. } | ParseError::UnbalancedParens { .. } => {
                    ErrorKind::Tokenize
                }
                ParseError::UnexpectedToken { .. } | ParseError::UnexpectedEof { .. } => {
                    ErrorKind::UnexpectedToken
                }
                ParseError::UnknownTable { .. } => ErrorKind::UnknownTable,
                ParseError::UnknownColumn { .. } => ErrorKind::UnknownColumn,
                ParseError::MixedColumnKind { .. } => ErrorKind::MixedColumnKind,
                ParseError::DuplicateColumnOrAlias(_) => ErrorKind::DuplicateColumnOrAlias,
                ParseError::ValueCountMismatch { .. } => ErrorKind::ValueCountMismatch,
            },
            Self::UnknownTable(_) => ErrorKind::UnknownTable,
            Self::UnknownColumn { .. } => ErrorKind::UnknownColumn,
            Self::AmbiguousColumn { .. } => ErrorKind::AmbiguousColumn,
            Self::DuplicateColumnOrAlias(_) => ErrorKind::DuplicateColumnOrAlias,
            Self::UnsupportedStatementShape(_) => ErrorKind::UnsupportedStatementShape,
            Self::InvalidSql { .. } => ErrorKind::InvalidSql,
            Self::DuplicateFunctionName { .. } => ErrorKind::DuplicateFunctionName,
            Self::Batch(_) => ErrorKind::Batch,
        }
    }
}
