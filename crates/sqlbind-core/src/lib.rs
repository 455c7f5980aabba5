//! # sqlbind-core
//!
//! Turns hand-written SQL into specifications for typed accessor functions.
//!
//! This crate provides:
//! - A tokenizer that keeps parenthesized groups and quoted literals whole
//!   and merges multi-word keywords
//! - A recursive descent statement parser with precedence climbing for
//!   expressions
//! - A resolver that decides, for every `?`, whether it binds a record
//!   field or a free parameter, and names it
//! - A plan assembler that synthesizes function names, result shapes and
//!   prepared-statement slots
//!
//! ## Example
//!
//! ```rust
//! use sqlbind_core::schema::{Column, Schema, Table};
//! use sqlbind_core::{parse_and_resolve, Options, ResultShape};
//!
//! let schema = Schema::new("shop").with_table(
//!     Table::new("user")
//!         .with_column(Column::new("id", "i64").primary_key())
//!         .with_column(Column::new("name", "String")),
//! );
//!
//! let spec = parse_and_resolve("select * from user where id = ?", &schema, &Options::default())?;
//! assert_eq!(spec.name, "SelectAllById");
//! assert_eq!(spec.result_shape, ResultShape::SingleRow);
//! assert_eq!(spec.sql, "select id,name from user where id = ?");
//! # Ok::<(), sqlbind_core::Error>(())
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod naming;
pub mod parser;
pub mod plan;
pub mod resolver;
pub mod schema;

pub use ast::{Expr, Statement};
pub use error::{Error, ErrorKind, Result};
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{parse_expression, parse_statement, FunctionRegistry, ParseError};
pub use plan::{
    BatchEntry, BatchPolicy, FunctionSpec, GenerationPlan, Generator, Options, ResultShape,
    SqlValidator,
};
pub use resolver::{resolve, Holder};
pub use schema::SchemaProvider;

/// Parses `sql`, resolves its placeholders against `schema` and assembles
/// the function specification, without a generation session.
///
/// The result always uses slot 0.
///
/// # Errors
///
/// Returns the first parse or resolution error.
pub fn parse_and_resolve(
    sql: &str,
    schema: &dyn SchemaProvider,
    options: &Options,
) -> Result<FunctionSpec> {
    Generator::new(schema, "").analyze(sql, options)
}
