//! SQL tokenizer.
//!
//! Produces a flat list of [`Token`]s. Parenthesized groups and quoted
//! literals are single tokens, and multi-word keywords are merged.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{JoinKind, Keyword, Token, TokenKind};
pub use tokenizer::{tokenize, Lexer};
