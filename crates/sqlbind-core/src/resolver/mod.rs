//! Placeholder resolution.
//!
//! Every `?` of a statement becomes a [`Holder`], in the order the
//! placeholders appear in the SQL text. A placeholder compared with (or
//! assigned to) a column of the statement's table or joined table is a
//! record field; everything else, including every placeholder inside a
//! subquery, is a free parameter.

mod holder;

pub use holder::{assign_names, demote_fields, Clause, Holder};

use crate::ast::{
    BinaryExpr, Distinct, Expr, FunctionArg, InsertSource, Operator, SelectColumns,
    SelectStatement, SortOrder, Statement,
};
use crate::error::{Error, Result};
use crate::naming::sanitize;
use crate::schema::{Column, SchemaProvider, Table};

/// Tables a column reference can resolve against.
#[derive(Clone)]
pub(crate) struct Scope<'a> {
    pub table: &'a Table,
    pub alias: Option<String>,
    pub join: Option<(&'a Table, Option<String>)>,
}

pub(crate) fn lookup_table<'a>(schema: &'a dyn SchemaProvider, name: &str) -> Result<&'a Table> {
    schema
        .table(name)
        .ok_or_else(|| Error::UnknownTable(name.to_string()))
}

impl<'a> Scope<'a> {
    pub fn of_table(schema: &'a dyn SchemaProvider, name: &str) -> Result<Self> {
        Ok(Self {
            table: lookup_table(schema, name)?,
            alias: None,
            join: None,
        })
    }

    pub fn of_select(schema: &'a dyn SchemaProvider, select: &SelectStatement) -> Result<Self> {
        let join = select
            .join
            .as_ref()
            .map(|join| lookup_table(schema, &join.table).map(|table| (table, join.alias.clone())))
            .transpose()?;
        Ok(Self {
            table: lookup_table(schema, &select.table)?,
            alias: select.table_alias.clone(),
            join,
        })
    }

    fn names_table(&self, qualifier: &str) -> bool {
        qualifier == self.table.name || self.alias.as_deref() == Some(qualifier)
    }

    fn joined(&self, qualifier: &str) -> Option<&'a Table> {
        self.join
            .as_ref()
            .filter(|(table, alias)| qualifier == table.name || alias.as_deref() == Some(qualifier))
            .map(|(table, _)| *table)
    }

    /// Resolves `column` or `qualifier.column`.
    ///
    /// # Errors
    ///
    /// An unqualified name found in both tables is ambiguous.
    pub fn resolve(&self, name: &str) -> Result<Option<(&'a Table, &'a Column)>> {
        if let Some((qualifier, column)) = name.rsplit_once('.') {
            if self.names_table(qualifier) {
                if let Some(col) = self.table.column(column) {
                    return Ok(Some((self.table, col)));
                }
            }
            return Ok(self
                .joined(qualifier)
                .and_then(|t| t.column(column).map(|c| (t, c))));
        }

        let in_table = self.table.column(name);
        let in_join = self
            .join
            .as_ref()
            .and_then(|(t, _)| t.column(name).map(|c| (*t, c)));
        match (in_table, in_join) {
            (Some(_), Some((join, _))) => Err(Error::AmbiguousColumn {
                column: name.to_string(),
                tables: vec![self.table.name.clone(), join.name.clone()],
            }),
            (Some(col), None) => Ok(Some((self.table, col))),
            (None, found) => Ok(found),
        }
    }
}

/// Walks a statement and collects its placeholders.
struct Walker<'a> {
    schema: &'a dyn SchemaProvider,
    scope: Scope<'a>,
    clause: Clause,
    depth: usize,
    holders: Vec<Holder>,
}

impl<'a> Walker<'a> {
    fn new(schema: &'a dyn SchemaProvider, scope: Scope<'a>) -> Self {
        Self {
            schema,
            scope,
            clause: Clause::Where,
            depth: 0,
            holders: Vec::new(),
        }
    }

    fn enter(&mut self, clause: Clause) {
        if self.depth == 0 {
            self.clause = clause;
        }
    }

    /// Records a placeholder compared with `left` through `op`.
    fn add(&mut self, left: Option<&str>, op: Option<Operator>) -> Result<()> {
        let in_subquery = self.depth > 0;
        let mut holder = Holder::new(self.clause, in_subquery);
        holder.operator = op;
        if let Some(left) = left {
            match self.scope.resolve(left)? {
                Some((table, column)) => {
                    holder.table = Some(table.name.clone());
                    holder.column = Some(column.name.clone());
                    holder.target_type = Some(column.target_type.clone());
                    holder.base = column.name.clone();
                    holder.is_field = !in_subquery;
                }
                None => {
                    let bare = left.rsplit_once('.').map_or(left, |(_, column)| column);
                    holder.base = sanitize(bare).to_string();
                }
            }
        }
        self.holders.push(holder);
        Ok(())
    }

    /// Records a `?` standing for a run-time choice such as the sort
    /// direction.
    fn add_marker(&mut self, kind: &str) {
        let mut holder = Holder::new(self.clause, self.depth > 0);
        holder.base = format!("{}_{kind}", self.scope.table.name);
        self.holders.push(holder);
    }

    fn walk_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Identifier(_) if expr.is_placeholder() => self.add(None, None),
            Expr::Identifier(_) => Ok(()),
            Expr::Binary(binary) => self.walk_binary(binary),
            Expr::BoolUnary(unary) => self.walk_expr(&unary.value),
            Expr::FuncCall(call) => match &call.arg {
                FunctionArg::Expr(arg) => self.walk_expr(arg),
                FunctionArg::Star | FunctionArg::Empty => Ok(()),
            },
            Expr::List(items) => items.iter().try_for_each(|item| self.walk_expr(item)),
            Expr::Select(select) => self.walk_subquery(select),
        }
    }

    fn walk_binary(&mut self, binary: &BinaryExpr) -> Result<()> {
        let left = binary.left.as_name();
        if left.is_none() {
            self.walk_expr(&binary.left)?;
        }
        let op = binary.op;

        match (op, binary.right.as_ref(), left) {
            (Operator::In | Operator::NotIn, Expr::List(items), Some(name)) => {
                for item in items {
                    self.walk_operand(name, op, item)?;
                }
                Ok(())
            }
            (Operator::Between | Operator::NotBetween, Expr::Binary(bounds), Some(name))
                if bounds.op == Operator::And =>
            {
                self.walk_operand(name, op, &bounds.left)?;
                self.walk_operand(name, op, &bounds.right)
            }
            (_, right, Some(name)) if right.is_placeholder() => self.add(Some(name), Some(op)),
            (_, right, _) => self.walk_expr(right),
        }
    }

    fn walk_operand(&mut self, name: &str, op: Operator, operand: &Expr) -> Result<()> {
        if operand.is_placeholder() {
            self.add(Some(name), Some(op))
        } else {
            self.walk_expr(operand)
        }
    }

    fn walk_subquery(&mut self, select: &SelectStatement) -> Result<()> {
        let scope = Scope::of_select(self.schema, select)?;
        let outer = std::mem::replace(&mut self.scope, scope);
        self.depth += 1;
        let walked = self.walk_select(select);
        self.depth -= 1;
        self.scope = outer;
        walked
    }

    fn walk_select(&mut self, select: &SelectStatement) -> Result<()> {
        self.enter(Clause::Distinct);
        if select.distinct == Distinct::Placeholder {
            self.add_marker("distinct");
        }

        self.enter(Clause::Columns);
        if let SelectColumns::Functions(functions) = &select.columns {
            for function in functions {
                if let FunctionArg::Expr(arg) = &function.call.arg {
                    self.walk_expr(arg)?;
                }
            }
        }

        if let Some(on) = select.join.as_ref().and_then(|j| j.on.as_ref()) {
            self.enter(Clause::On);
            self.walk_expr(on)?;
        }
        if let Some(where_clause) = &select.where_clause {
            self.enter(Clause::Where);
            self.walk_expr(where_clause)?;
        }

        self.enter(Clause::GroupBy);
        for item in &select.group_by {
            if item == "?" {
                self.add_marker("group");
            }
        }

        if let Some(having) = &select.having {
            self.enter(Clause::Having);
            self.walk_expr(having)?;
        }
        if let Some(union) = &select.union {
            self.enter(Clause::Union);
            self.walk_subquery(&union.select)?;
        }

        self.enter(Clause::OrderBy);
        for item in &select.order_by {
            if item == "?" {
                self.add_marker("order");
            }
        }
        self.enter(Clause::Sort);
        if select.order == Some(SortOrder::Placeholder) {
            self.add_marker("sort");
        }
        self.enter(Clause::Limit);
        for item in &select.limit {
            if item == "?" {
                self.add_marker("limit");
            }
        }
        Ok(())
    }
}

/// Classifies every placeholder of `stmt` without naming them.
///
/// # Errors
///
/// Fails for tables the schema does not know, ambiguous unqualified
/// columns, and bare expressions.
pub fn collect_holders(stmt: &Statement, schema: &dyn SchemaProvider) -> Result<Vec<Holder>> {
    let mut walker = match stmt {
        Statement::Select(select) => {
            let mut walker = Walker::new(schema, Scope::of_select(schema, select)?);
            walker.walk_select(select)?;
            walker
        }
        Statement::Insert(insert) => {
            let scope = Scope::of_table(schema, &insert.table)?;
            let columns: Vec<&str> = if insert.columns.is_empty() {
                scope.table.columns().iter().map(|c| c.name.as_str()).collect()
            } else {
                insert.columns.iter().map(String::as_str).collect()
            };
            let mut walker = Walker::new(schema, scope);
            match &insert.source {
                InsertSource::Values(values) => {
                    walker.enter(Clause::Values);
                    for (i, value) in values.iter().enumerate() {
                        match columns.get(i) {
                            Some(column) => walker.walk_operand(column, Operator::Eq, value)?,
                            None => walker.walk_expr(value)?,
                        }
                    }
                }
                InsertSource::Select(select) => {
                    walker.enter(Clause::Source);
                    walker.walk_subquery(select)?;
                }
            }
            walker
        }
        Statement::Update(update) => {
            let mut walker = Walker::new(schema, Scope::of_table(schema, &update.table)?);
            walker.enter(Clause::Set);
            for assignment in &update.assignments {
                walker.walk_operand(&assignment.column, Operator::Eq, &assignment.value)?;
            }
            if let Some(where_clause) = &update.where_clause {
                walker.enter(Clause::Where);
                walker.walk_expr(where_clause)?;
            }
            walker
        }
        Statement::Delete(delete) => {
            let mut walker = Walker::new(schema, Scope::of_table(schema, &delete.table)?);
            if let Some(where_clause) = &delete.where_clause {
                walker.walk_expr(where_clause)?;
            }
            walker
        }
        Statement::Expression(_) => {
            return Err(Error::UnsupportedStatementShape(
                "a bare expression is not a select, insert, update or delete".to_string(),
            ))
        }
    };
    Ok(std::mem::take(&mut walker.holders))
}

/// Classifies and names every placeholder of `stmt`.
///
/// # Errors
///
/// See [`collect_holders`].
pub fn resolve(stmt: &Statement, schema: &dyn SchemaProvider) -> Result<Vec<Holder>> {
    let mut holders = collect_holders(stmt, schema)?;
    let has_join = matches!(stmt, Statement::Select(s) if s.join.is_some());
    assign_names(&mut holders, has_join);
    tracing::debug!(verb = stmt.verb(), holders = holders.len(), "resolved placeholders");
    Ok(holders)
}
