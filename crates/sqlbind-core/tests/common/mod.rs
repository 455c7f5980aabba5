#![allow(dead_code)]

use std::sync::LazyLock;

use sqlbind_core::ast::{
    DeleteStatement, Expr, InsertStatement, SelectStatement, Statement, UpdateStatement,
};
use sqlbind_core::schema::{Column, Schema, Table};
use sqlbind_core::{
    parse_and_resolve, parse_expression, parse_statement, resolve, tokenize, Error,
    FunctionSpec, Holder, Options, ParseError,
};

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Fixture")
        .with_table(
            Table::new("t")
                .with_column(Column::new("id", "i64").primary_key().auto_increment())
                .with_column(Column::new("name", "String").unique())
                .with_column(Column::new("a", "i64"))
                .with_column(Column::new("b", "i64"))
                .with_column(Column::new("note", "String").nullable())
                .with_unique_group("ab", ["a", "b"]),
        )
        .with_table(
            Table::new("t1")
                .with_column(Column::new("id", "i64").primary_key())
                .with_column(Column::new("name", "String"))
                .with_column(Column::new("value", "i64")),
        )
        .with_table(
            Table::new("t2")
                .with_column(Column::new("id", "i64").primary_key())
                .with_column(Column::new("t1_id", "i64"))
                .with_column(Column::new("name", "String")),
        )
        .with_table(
            Table::new("user_account")
                .with_column(Column::new("id", "i64").primary_key().auto_increment())
                .with_column(Column::new("email", "String").unique())
                .with_column(Column::new("nick_name", "String"))
                .with_column(Column::new("age", "i64").nullable()),
        )
});

/// Tables `t` (unique `name`, unique group `a, b`), `t1`, `t2` (both with
/// `id` and `name`) and `user_account`.
pub fn schema() -> &'static Schema {
    &SCHEMA
}

pub fn expr(sql: &str) -> Expr {
    let tokens = tokenize(sql).unwrap_or_else(|e| panic!("Failed to tokenize: {sql}\nError: {e:?}"));
    let (expr, rest) =
        parse_expression(&tokens).unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"));
    assert!(rest.is_empty(), "Unparsed tokens after: {sql}");
    expr
}

pub fn parse(sql: &str) -> Statement {
    parse_statement(sql, schema())
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
}

pub fn parse_err(sql: &str) -> ParseError {
    parse_statement(sql, schema()).expect_err(&format!("Expected parse error for: {sql}"))
}

pub fn parse_select(sql: &str) -> SelectStatement {
    match parse(sql) {
        Statement::Select(s) => s,
        other => panic!("Expected SELECT, got {other:?}"),
    }
}

pub fn parse_insert(sql: &str) -> InsertStatement {
    match parse(sql) {
        Statement::Insert(i) => i,
        other => panic!("Expected INSERT, got {other:?}"),
    }
}

pub fn parse_update(sql: &str) -> UpdateStatement {
    match parse(sql) {
        Statement::Update(u) => u,
        other => panic!("Expected UPDATE, got {other:?}"),
    }
}

pub fn parse_delete(sql: &str) -> DeleteStatement {
    match parse(sql) {
        Statement::Delete(d) => d,
        other => panic!("Expected DELETE, got {other:?}"),
    }
}

pub fn holders(sql: &str) -> Vec<Holder> {
    resolve(&parse(sql), schema())
        .unwrap_or_else(|e| panic!("Failed to resolve: {sql}\nError: {e:?}"))
}

pub fn resolve_err(sql: &str) -> Error {
    resolve(&parse(sql), schema()).expect_err(&format!("Expected resolve error for: {sql}"))
}

pub fn holder_names(sql: &str) -> Vec<String> {
    holders(sql).into_iter().map(|h| h.name).collect()
}

pub fn analyze(sql: &str) -> FunctionSpec {
    analyze_with(sql, &Options::default())
}

pub fn analyze_with(sql: &str, options: &Options) -> FunctionSpec {
    parse_and_resolve(sql, schema(), options)
        .unwrap_or_else(|e| panic!("Failed to analyze: {sql}\nError: {e:?}"))
}

pub fn analyze_err(sql: &str) -> Error {
    parse_and_resolve(sql, schema(), &Options::default())
        .expect_err(&format!("Expected analysis error for: {sql}"))
}

pub fn param_names(spec: &FunctionSpec) -> Vec<&str> {
    spec.parameters.iter().map(|h| h.name.as_str()).collect()
}
