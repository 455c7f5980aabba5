//! SQL parser.
//!
//! [`parse_statement`] turns one SQL statement into a [`Statement`],
//! checking table and column names against a schema along the way.
//! [`parse_expression`] exposes the expression grammar on its own.

mod error;
mod functions;
#[allow(clippy::module_inception)]
mod parser;

pub use error::ParseError;
pub use functions::FunctionRegistry;
pub use parser::{ParseContext, Parser};

use crate::ast::{Expr, Statement};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::schema::SchemaProvider;

/// Parses the longest expression at the start of `tokens` and returns it
/// together with the tokens that follow it.
///
/// # Errors
///
/// Returns a [`ParseError`] if no expression can be read.
pub fn parse_expression(tokens: &[Token]) -> Result<(Expr, &[Token]), ParseError> {
    let mut parser = Parser::new(tokens, ParseContext::default());
    let expr = parser.parse_expr()?;
    Ok((expr, parser.remaining()))
}

/// Parses one statement using the built-in function names.
///
/// # Errors
///
/// See [`parse_sql`].
pub fn parse_statement(sql: &str, schema: &dyn SchemaProvider) -> Result<Statement, ParseError> {
    parse_sql(sql, ParseContext::default().with_schema(schema))
}

/// Parses one statement with an explicit context.
///
/// A statement wrapped in one or more pairs of parentheses is unwrapped
/// first.
///
/// # Errors
///
/// Returns a [`ParseError`] for malformed input, trailing tokens, or table
/// and column names the context's schema does not know.
pub fn parse_sql(sql: &str, ctx: ParseContext<'_>) -> Result<Statement, ParseError> {
    let tokens = unwrap_parens(tokenize(sql)?)?;
    tracing::trace!(tokens = tokens.len(), "parsing statement");
    Parser::new(&tokens, ctx).parse_statement()
}

fn unwrap_parens(mut tokens: Vec<Token>) -> Result<Vec<Token>, ParseError> {
    loop {
        let inner = match tokens.as_slice() {
            [group] | [group, Token {
                kind: TokenKind::Semicolon,
                ..
            }] if group.kind == TokenKind::Group => parser::group_tokens(group)?,
            _ => return Ok(tokens),
        };
        tokens = inner;
    }
}
