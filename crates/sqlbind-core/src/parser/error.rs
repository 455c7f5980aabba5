//! Tokenizer and parser errors.

use crate::lexer::Span;

fn render_trail(trail: &[String]) -> String {
    if trail.is_empty() {
        String::new()
    } else {
        format!(" (after '{}')", trail.join(" "))
    }
}

/// Errors raised while tokenizing or parsing a statement.
///
/// Grammar errors carry the offending token text, its span in the original
/// SQL, what the parser wanted instead, and the last few tokens consumed
/// before the failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A quote with no matching closing quote.
    #[error("Unterminated literal at {span}")]
    UnterminatedLiteral { span: Span },

    /// A `(` that is never closed, or a stray `)`.
    #[error("Unbalanced parentheses at {span}")]
    UnbalancedParens { span: Span },

    #[error("Unexpected token '{found}' at {span}: expected {expected}{}", render_trail(.trail))]
    UnexpectedToken {
        found: String,
        span: Span,
        expected: String,
        trail: Vec<String>,
    },

    #[error("Unexpected end of input: expected {expected}{}", render_trail(.trail))]
    UnexpectedEof {
        expected: String,
        span: Span,
        trail: Vec<String>,
    },

    #[error("Unknown table '{table}' at {span}")]
    UnknownTable { table: String, span: Span },

    #[error("Unknown column '{column}' in table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// The result column list mixes plain columns, `*` and function calls.
    #[error("Result columns must be a single '*', plain columns, or function calls; found '{found}' at {span}")]
    MixedColumnKind { found: String, span: Span },

    #[error("Duplicate result column '{0}'")]
    DuplicateColumnOrAlias(String),

    #[error("Value count {values} does not match column count {columns}")]
    ValueCountMismatch { columns: usize, values: usize },
}

impl ParseError {
    /// Location of the error, if it has one.
    #[must_use]
    pub const fn span(&self) -> Option<Span> {
        match self {
            Self::UnterminatedLiteral { span }
            | Self::UnbalancedParens { span }
            | Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEof { span, .. }
            | Self::UnknownTable { span, .. }
            | Self::MixedColumnKind { span, .. } => Some(*span),
            _ => None,
        }
    }
}
