//! Recursive-descent statement parser with precedence climbing for
//! expressions.

use super::{FunctionRegistry, ParseError};
use crate::ast::{
    AliasedColumn, AliasedFunction, Assignment, BoolUnaryExpr, DeleteStatement, Distinct, Expr,
    FunctionArg, FunctionCall, InsertSource, InsertStatement, JoinClause, Operator, SelectColumns,
    SelectStatement, SortOrder, Statement, Union, UpdateStatement,
};
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};
use crate::schema::SchemaProvider;

/// How many consumed tokens an error reports.
const TRAIL_LEN: usize = 4;

/// Read-only inputs shared by a parser and all of its sub-parsers.
#[derive(Clone, Copy)]
pub struct ParseContext<'c> {
    pub functions: &'c FunctionRegistry,
    /// When present, table and column names are checked against it.
    pub schema: Option<&'c dyn SchemaProvider>,
}

impl<'c> ParseContext<'c> {
    #[must_use]
    pub const fn new(functions: &'c FunctionRegistry) -> Self {
        Self {
            functions,
            schema: None,
        }
    }

    #[must_use]
    pub const fn with_schema(mut self, schema: &'c dyn SchemaProvider) -> Self {
        self.schema = Some(schema);
        self
    }
}

impl Default for ParseContext<'static> {
    fn default() -> Self {
        Self::new(FunctionRegistry::builtin())
    }
}

/// Tokenizes the body of a group token.
pub fn group_tokens(group: &Token) -> Result<Vec<Token>, ParseError> {
    let (body, offset) = group.group_body().ok_or_else(|| ParseError::UnexpectedToken {
        found: group.text.clone(),
        span: group.span,
        expected: "parenthesized group".to_string(),
        trail: Vec::new(),
    })?;
    Lexer::with_offset(body, offset).tokenize()
}

/// Parser over a borrowed token slice.
///
/// Parenthesized groups are parsed by a fresh sub-parser over the group's
/// own tokens; the outer parser never rewinds.
pub struct Parser<'t, 'c> {
    tokens: &'t [Token],
    pos: usize,
    /// Source position reported for errors at end of input.
    end: usize,
    ctx: ParseContext<'c>,
}

impl<'t, 'c> Parser<'t, 'c> {
    #[must_use]
    pub fn new(tokens: &'t [Token], ctx: ParseContext<'c>) -> Self {
        let end = tokens.last().map_or(0, |t| t.span.end);
        Self {
            tokens,
            pos: 0,
            end,
            ctx,
        }
    }

    const fn nested<'s>(&self, tokens: &'s [Token], end: usize) -> Parser<'s, 'c> {
        Parser {
            tokens,
            pos: 0,
            end,
            ctx: self.ctx,
        }
    }

    /// Tokens not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> &'t [Token] {
        &self.tokens[self.pos.min(self.tokens.len())..]
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(keyword))
    }

    fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn match_kind(&mut self, kind: TokenKind) -> Option<&'t Token> {
        let token = self.peek().filter(|t| t.kind == kind)?;
        self.pos += 1;
        Some(token)
    }

    fn trail(&self) -> Vec<String> {
        let end = self.pos.min(self.tokens.len());
        self.tokens[end.saturating_sub(TRAIL_LEN)..end]
            .iter()
            .map(|t| t.text.clone())
            .collect()
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::UnexpectedToken {
                found: token.text.clone(),
                span: token.span,
                expected: expected.to_string(),
                trail: self.trail(),
            },
            None => ParseError::UnexpectedEof {
                expected: expected.to_string(),
                span: Span::point(self.end),
                trail: self.trail(),
            },
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<&'t Token, ParseError> {
        match self.peek() {
            Some(token) if token.is_keyword(keyword) => {
                self.pos += 1;
                Ok(token)
            }
            _ => Err(self.unexpected(&format!("'{}'", keyword.as_str()))),
        }
    }

    fn expect_kind(&mut self, kind: TokenKind, expected: &str) -> Result<&'t Token, ParseError> {
        match self.match_kind(kind) {
            Some(token) => Ok(token),
            None => Err(self.unexpected(expected)),
        }
    }

    fn expect_end(&self, expected: &str) -> Result<(), ParseError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// A table or column name: a bare word or a backtick-quoted one.
    fn expect_name(&mut self, expected: &str) -> Result<(String, Span), ParseError> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Identifier => {
                self.pos += 1;
                Ok((token.text.clone(), token.span))
            }
            Some(token) if token.kind == TokenKind::Quoted && token.text.starts_with('`') => {
                self.pos += 1;
                let name = token.text.trim_matches('`').to_string();
                Ok((name, token.span))
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// A `group by`, `order by` or `limit` item: a word or `?`.
    fn expect_item(&mut self, expected: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(token) if matches!(token.kind, TokenKind::Identifier | TokenKind::Placeholder) => {
                self.pos += 1;
                Ok(token.text.clone())
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn parse_alias(&mut self) -> Result<Option<String>, ParseError> {
        if self.match_keyword(Keyword::As) {
            return self.expect_name("alias").map(|(name, _)| Some(name));
        }
        Ok(self
            .match_kind(TokenKind::Identifier)
            .map(|token| token.text.clone()))
    }

    fn check_table(&self, table: &str, span: Span) -> Result<(), ParseError> {
        match self.ctx.schema {
            Some(schema) if schema.table(table).is_none() => Err(ParseError::UnknownTable {
                table: table.to_string(),
                span,
            }),
            _ => Ok(()),
        }
    }

    fn check_column(&self, table: &str, column: &str) -> Result<(), ParseError> {
        let Some(schema) = self.ctx.schema else {
            return Ok(());
        };
        match schema.table(table) {
            Some(t) if t.column(column).is_some() => Ok(()),
            _ => Err(ParseError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            }),
        }
    }

    // ===================================================================
    // Statements
    // ===================================================================

    /// Parses one statement, an optional `;`, and requires end of input.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing the first token that does not
    /// fit the grammar, or a schema lookup miss.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let statement = match self.peek_kind() {
            Some(TokenKind::Keyword(Keyword::Select)) => Statement::Select(self.parse_select()?),
            Some(TokenKind::Keyword(Keyword::InsertInto)) => {
                Statement::Insert(self.parse_insert()?)
            }
            Some(TokenKind::Keyword(Keyword::Update)) => Statement::Update(self.parse_update()?),
            Some(TokenKind::Keyword(Keyword::DeleteFrom)) => {
                Statement::Delete(self.parse_delete()?)
            }
            _ => Statement::Expression(self.parse_expr()?),
        };
        self.match_kind(TokenKind::Semicolon);
        self.expect_end("end of statement")?;
        Ok(statement)
    }

    /// `select ...` including the trailing `order by` and `limit`.
    fn parse_select(&mut self) -> Result<SelectStatement, ParseError> {
        let mut select = self.parse_select_body()?;

        if self.match_keyword(Keyword::OrderBy) {
            loop {
                select.order_by.push(self.expect_item("order by item")?);
                if self.match_kind(TokenKind::Comma).is_none() {
                    break;
                }
            }
            select.order = match self.peek_kind() {
                Some(TokenKind::Keyword(Keyword::Asc)) => Some(SortOrder::Asc),
                Some(TokenKind::Keyword(Keyword::Desc)) => Some(SortOrder::Desc),
                Some(TokenKind::Placeholder) => Some(SortOrder::Placeholder),
                _ => None,
            };
            if select.order.is_some() {
                self.pos += 1;
            }
        }

        if self.match_keyword(Keyword::Limit) {
            select.limit.push(self.expect_item("limit bound")?);
            if self.match_kind(TokenKind::Comma).is_some() {
                select.limit.push(self.expect_item("limit bound")?);
            }
        }

        Ok(select)
    }

    /// `select` up to and including an optional `union` branch.
    fn parse_select_body(&mut self) -> Result<SelectStatement, ParseError> {
        self.expect_keyword(Keyword::Select)?;

        let distinct = match self.peek_kind() {
            Some(TokenKind::Keyword(Keyword::All)) => Distinct::All,
            Some(TokenKind::Keyword(Keyword::Distinct)) => Distinct::Distinct,
            Some(TokenKind::Placeholder) => Distinct::Placeholder,
            _ => Distinct::Unspecified,
        };
        if distinct != Distinct::Unspecified {
            self.pos += 1;
        }

        let columns = self.parse_select_columns()?;

        let (table, span) = self.expect_name("table name")?;
        self.check_table(&table, span)?;
        let table_alias = self.parse_alias()?;

        let join = match self.peek_kind() {
            Some(TokenKind::Keyword(Keyword::Join(kind))) => {
                self.pos += 1;
                let (table, span) = self.expect_name("joined table name")?;
                self.check_table(&table, span)?;
                let alias = self.parse_alias()?;
                let on = if self.match_keyword(Keyword::On) {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                Some(JoinClause {
                    kind,
                    table,
                    alias,
                    on,
                })
            }
            _ => None,
        };

        let where_clause = if self.match_keyword(Keyword::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let mut group_by = Vec::new();
        if self.match_keyword(Keyword::GroupBy) {
            loop {
                group_by.push(self.expect_item("group by item")?);
                if self.match_kind(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        let having = if self.match_keyword(Keyword::Having) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let union = match self.peek_kind() {
            Some(TokenKind::Keyword(kw @ (Keyword::Union | Keyword::UnionAll))) => {
                self.pos += 1;
                Some(Union {
                    all: kw == Keyword::UnionAll,
                    select: Box::new(self.parse_select_body()?),
                })
            }
            _ => None,
        };

        Ok(SelectStatement {
            distinct,
            columns,
            table,
            table_alias,
            join,
            where_clause,
            group_by,
            having,
            union,
            order_by: Vec::new(),
            order: None,
            limit: Vec::new(),
        })
    }

    /// The result column list, through the `from` keyword.
    fn parse_select_columns(&mut self) -> Result<SelectColumns, ParseError> {
        if let Some(star) = self.peek().filter(|t| t.is_operator("*")) {
            self.pos += 1;
            if self.peek_kind() == Some(TokenKind::Comma) {
                return Err(ParseError::MixedColumnKind {
                    found: star.text.clone(),
                    span: star.span,
                });
            }
            self.expect_keyword(Keyword::From)?;
            return Ok(SelectColumns::Star(star.span));
        }

        let mut plain: Vec<AliasedColumn> = Vec::new();
        let mut functions: Vec<AliasedFunction> = Vec::new();
        loop {
            let start = self.pos;
            if let Some(star) = self.peek().filter(|t| t.is_operator("*")) {
                return Err(ParseError::MixedColumnKind {
                    found: star.text.clone(),
                    span: star.span,
                });
            }
            let expr = self.parse_expr()?;
            let span = self.tokens[start].span.merge(self.tokens[self.pos - 1].span);

            match expr {
                Expr::Identifier(name) if functions.is_empty() => {
                    let alias = self.parse_alias()?;
                    let taken = |c: &AliasedColumn| {
                        c.name == name || (alias.is_some() && c.alias == alias)
                    };
                    if plain.iter().any(taken) {
                        return Err(ParseError::DuplicateColumnOrAlias(alias.unwrap_or(name)));
                    }
                    plain.push(AliasedColumn { name, alias });
                }
                Expr::FuncCall(call) if plain.is_empty() => {
                    let alias = self.parse_alias()?;
                    if alias.is_some() && functions.iter().any(|f| f.alias == alias) {
                        return Err(ParseError::DuplicateColumnOrAlias(
                            alias.unwrap_or_default(),
                        ));
                    }
                    functions.push(AliasedFunction { call, alias });
                }
                other => {
                    return Err(ParseError::MixedColumnKind {
                        found: other.to_string(),
                        span,
                    })
                }
            }

            if self.match_keyword(Keyword::From) {
                break;
            }
            self.expect_kind(TokenKind::Comma, "',' or 'from'")?;
        }

        Ok(if functions.is_empty() {
            SelectColumns::Columns(plain)
        } else {
            SelectColumns::Functions(functions)
        })
    }

    fn parse_insert(&mut self) -> Result<InsertStatement, ParseError> {
        self.expect_keyword(Keyword::InsertInto)?;
        let (table, span) = self.expect_name("table name")?;
        self.check_table(&table, span)?;

        let mut columns = Vec::new();
        if let Some(group) = self.match_kind(TokenKind::Group) {
            let tokens = group_tokens(group)?;
            let mut list = self.nested(&tokens, group.span.end - 1);
            loop {
                let (column, _) = list.expect_name("column name")?;
                self.check_column(&table, &column)?;
                columns.push(column);
                if list.is_empty() {
                    break;
                }
                list.expect_kind(TokenKind::Comma, "',' or ')'")?;
            }
        }

        let source = if self.check_keyword(Keyword::Select) {
            InsertSource::Select(Box::new(self.parse_select()?))
        } else {
            self.expect_keyword(Keyword::Values)?;
            let group = self.expect_kind(TokenKind::Group, "'(' value list")?;
            let tokens = group_tokens(group)?;
            let mut list = self.nested(&tokens, group.span.end - 1);
            let values = list.parse_comma_list()?;

            let expected = if columns.is_empty() {
                self.ctx
                    .schema
                    .and_then(|s| s.table(&table))
                    .map(|t| t.columns().len())
            } else {
                Some(columns.len())
            };
            if let Some(expected) = expected.filter(|n| *n != values.len()) {
                return Err(ParseError::ValueCountMismatch {
                    columns: expected,
                    values: values.len(),
                });
            }
            InsertSource::Values(values)
        };

        Ok(InsertStatement {
            table,
            columns,
            source,
        })
    }

    fn parse_update(&mut self) -> Result<UpdateStatement, ParseError> {
        self.expect_keyword(Keyword::Update)?;
        let (table, span) = self.expect_name("table name")?;
        self.check_table(&table, span)?;
        self.expect_keyword(Keyword::Set)?;

        let mut assignments = Vec::new();
        loop {
            let (column, _) = self.expect_name("column name")?;
            self.check_column(&table, &column)?;
            match self.peek() {
                Some(token) if token.is_operator("=") => self.pos += 1,
                _ => return Err(self.unexpected("'='")),
            }
            let value = self.parse_expr()?;
            assignments.push(Assignment { column, value });
            if self.match_kind(TokenKind::Comma).is_none() {
                break;
            }
        }

        let where_clause = if self.match_keyword(Keyword::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(UpdateStatement {
            table,
            assignments,
            where_clause,
        })
    }

    fn parse_delete(&mut self) -> Result<DeleteStatement, ParseError> {
        self.expect_keyword(Keyword::DeleteFrom)?;
        let (table, span) = self.expect_name("table name")?;
        self.check_table(&table, span)?;
        let where_clause = if self.match_keyword(Keyword::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(DeleteStatement {
            table,
            where_clause,
        })
    }

    // ===================================================================
    // Expressions
    // ===================================================================

    /// Parses one expression, leaving any tokens that cannot continue it.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] on malformed input.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_within(u8::MAX)
    }

    /// Precedence climbing: only operators binding tighter than `limit` are
    /// folded into the current expression.
    fn parse_expr_within(&mut self, limit: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_value()?;
        while let Some(op) = self.peek_infix() {
            if op.precedence() >= limit {
                break;
            }
            self.pos += 1;
            let right = self.parse_operand(op)?;
            left = Expr::binary(left, op, right);
        }
        Ok(left)
    }

    fn peek_infix(&self) -> Option<Operator> {
        let token = self.peek()?;
        let op = match token.kind {
            TokenKind::Operator => Operator::from_symbol(&token.text)?,
            TokenKind::Keyword(keyword) => Operator::from_keyword(keyword)?,
            _ => return None,
        };
        // exists only appears in prefix position
        (!matches!(op, Operator::Exists | Operator::NotExists)).then_some(op)
    }

    /// The right-hand side of `op`.
    fn parse_operand(&mut self, op: Operator) -> Result<Expr, ParseError> {
        match op {
            Operator::Between | Operator::NotBetween => {
                let Some(and_at) = self.tokens[self.pos..]
                    .iter()
                    .position(|t| t.is_keyword(Keyword::And))
                    .map(|i| self.pos + i)
                else {
                    return Err(ParseError::UnexpectedEof {
                        expected: format!("'and' closing '{op}'"),
                        span: Span::point(self.end),
                        trail: self.trail(),
                    });
                };
                let bound_end = self.tokens[and_at].span.start;
                let mut lower = self.nested(&self.tokens[self.pos..and_at], bound_end);
                let low = lower.parse_expr()?;
                lower.expect_end("'and'")?;
                self.pos = and_at + 1;
                let high = self.parse_expr_within(op.precedence())?;
                Ok(Expr::binary(low, Operator::And, high))
            }
            Operator::In | Operator::NotIn => {
                let group = self.expect_kind(TokenKind::Group, "'(' list")?;
                Ok(match self.parse_group(group)? {
                    list @ (Expr::List(_) | Expr::Select(_)) => list,
                    single => Expr::List(vec![single]),
                })
            }
            Operator::Is | Operator::IsNot => match self.peek() {
                Some(token)
                    if token.kind == TokenKind::Placeholder || token.is_word("null") =>
                {
                    self.pos += 1;
                    Ok(Expr::Identifier(token.text.clone()))
                }
                _ => Err(self.unexpected("'null' or '?'")),
            },
            _ => self.parse_expr_within(op.precedence()),
        }
    }

    /// A single operand: a group, `exists (...)`, a function call, or a
    /// word, placeholder or literal.
    fn parse_value(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.unexpected("expression"));
        };
        match token.kind {
            TokenKind::Group => {
                self.pos += 1;
                self.parse_group(token)
            }
            TokenKind::Keyword(keyword @ (Keyword::Exists | Keyword::NotExists)) => {
                self.pos += 1;
                let op = if keyword == Keyword::Exists {
                    Operator::Exists
                } else {
                    Operator::NotExists
                };
                let group = self.expect_kind(TokenKind::Group, "'(' after exists")?;
                Ok(Expr::BoolUnary(BoolUnaryExpr {
                    op,
                    value: Box::new(self.parse_group(group)?),
                }))
            }
            TokenKind::Identifier if self.ctx.functions.contains(&token.text) => {
                match self.tokens.get(self.pos + 1) {
                    Some(group) if group.kind == TokenKind::Group => {
                        self.pos += 2;
                        self.parse_call(token, group)
                    }
                    _ => {
                        self.pos += 1;
                        Ok(Expr::Identifier(token.text.clone()))
                    }
                }
            }
            TokenKind::Identifier | TokenKind::Placeholder | TokenKind::Quoted => {
                self.pos += 1;
                Ok(Expr::Identifier(token.text.clone()))
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// A parenthesized value: a subquery, a single expression, or a list.
    fn parse_group(&self, group: &Token) -> Result<Expr, ParseError> {
        let tokens = group_tokens(group)?;
        let mut inner = self.nested(&tokens, group.span.end - 1);
        if inner.check_keyword(Keyword::Select) {
            let select = inner.parse_select()?;
            inner.expect_end("')'")?;
            return Ok(Expr::Select(Box::new(select)));
        }
        let mut items = inner.parse_comma_list()?;
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            Expr::List(items)
        })
    }

    fn parse_call(&self, name: &Token, group: &Token) -> Result<Expr, ParseError> {
        let tokens = group_tokens(group)?;
        let arg = match tokens.as_slice() {
            [] => FunctionArg::Empty,
            [only] if only.is_operator("*") => FunctionArg::Star,
            _ => {
                let mut inner = self.nested(&tokens, group.span.end - 1);
                let mut items = inner.parse_comma_list()?;
                let value = if items.len() == 1 {
                    items.remove(0)
                } else {
                    Expr::List(items)
                };
                FunctionArg::Expr(Box::new(value))
            }
        };
        Ok(Expr::FuncCall(FunctionCall {
            name: name.text.clone(),
            arg,
        }))
    }

    /// `expr [, expr]*` to the end of this parser's tokens.
    fn parse_comma_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut items = vec![self.parse_expr()?];
        while !self.is_empty() {
            self.expect_kind(TokenKind::Comma, "',' or ')'")?;
            items.push(self.parse_expr()?);
        }
        Ok(items)
    }
}
