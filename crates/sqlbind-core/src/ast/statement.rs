//! Statement AST types.

use std::fmt;

use serde::Serialize;

use super::{Expr, FunctionCall};
use crate::lexer::{JoinKind, Span};

/// A parsed top-level statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    /// Input that does not start with a statement verb.
    Expression(Expr),
}

impl Statement {
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Select(_) => "select",
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
            Self::Expression(_) => "expression",
        }
    }
}

/// `select [all|distinct|?]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Distinct {
    #[default]
    Unspecified,
    All,
    Distinct,
    /// Chosen at run time through a bind parameter.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasedColumn {
    /// `column` or `table.column` as written.
    pub name: String,
    /// Name after `as`, or after the column when `as` is omitted.
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AliasedFunction {
    pub call: FunctionCall,
    /// Replaces the function name as the scan target.
    pub alias: Option<String>,
}

/// The result column list. Plain columns and function calls never mix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SelectColumns {
    /// `*`, with the position of the star in the source text.
    Star(Span),
    /// Plain, possibly qualified, columns.
    Columns(Vec<AliasedColumn>),
    Functions(Vec<AliasedFunction>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinClause {
    pub kind: JoinKind,
    /// The joined table.
    pub table: String,
    pub alias: Option<String>,
    /// Predicate after `on`, when one is given.
    pub on: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Union {
    /// `union all` rather than `union`.
    pub all: bool,
    /// The right-hand branch. It never carries its own order or limit.
    pub select: Box<SelectStatement>,
}

/// Sort direction after `order by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    Asc,
    Desc,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectStatement {
    pub distinct: Distinct,
    pub columns: SelectColumns,
    /// The primary table after `from`.
    pub table: String,
    pub table_alias: Option<String>,
    /// At most one joined table.
    pub join: Option<JoinClause>,
    pub where_clause: Option<Expr>,
    /// Grouping items as written; `?` marks a run-time choice.
    pub group_by: Vec<String>,
    pub having: Option<Expr>,
    pub union: Option<Union>,
    /// Ordering items as written; `?` marks a run-time choice.
    pub order_by: Vec<String>,
    /// Direction following the `order by` items.
    pub order: Option<SortOrder>,
    /// One or two bounds; `?` marks a bind parameter.
    pub limit: Vec<String>,
}

impl SelectStatement {
    /// True if `qualifier` names the primary table, directly or by alias.
    #[must_use]
    pub fn names_table(&self, qualifier: &str) -> bool {
        qualifier == self.table || self.table_alias.as_deref() == Some(qualifier)
    }

    /// True if `qualifier` names the joined table, directly or by alias.
    #[must_use]
    pub fn names_join(&self, qualifier: &str) -> bool {
        self.join
            .as_ref()
            .is_some_and(|j| qualifier == j.table || j.alias.as_deref() == Some(qualifier))
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
            Self::Placeholder => "?",
        })
    }
}

/// Renders the statement back to SQL, normalized to lower-case keywords.
impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("select ")?;
        match self.distinct {
            Distinct::Unspecified => {}
            Distinct::All => f.write_str("all ")?,
            Distinct::Distinct => f.write_str("distinct ")?,
            Distinct::Placeholder => f.write_str("? ")?,
        }
        match &self.columns {
            SelectColumns::Star(_) => f.write_str("*")?,
            SelectColumns::Columns(columns) => {
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(&column.name)?;
                    if let Some(alias) = &column.alias {
                        write!(f, " as {alias}")?;
                    }
                }
            }
            SelectColumns::Functions(functions) => {
                for (i, function) in functions.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", function.call)?;
                    if let Some(alias) = &function.alias {
                        write!(f, " as {alias}")?;
                    }
                }
            }
        }
        write!(f, " from {}", self.table)?;
        if let Some(alias) = &self.table_alias {
            write!(f, " {alias}")?;
        }
        if let Some(join) = &self.join {
            write!(f, " {} {}", join.kind.as_str(), join.table)?;
            if let Some(alias) = &join.alias {
                write!(f, " {alias}")?;
            }
            if let Some(on) = &join.on {
                write!(f, " on {on}")?;
            }
        }
        if let Some(predicate) = &self.where_clause {
            write!(f, " where {predicate}")?;
        }
        if !self.group_by.is_empty() {
            write!(f, " group by {}", self.group_by.join(", "))?;
        }
        if let Some(having) = &self.having {
            write!(f, " having {having}")?;
        }
        if let Some(union) = &self.union {
            let all = if union.all { " all" } else { "" };
            write!(f, " union{all} {}", union.select)?;
        }
        if !self.order_by.is_empty() {
            write!(f, " order by {}", self.order_by.join(", "))?;
        }
        if let Some(order) = self.order {
            write!(f, " {order}")?;
        }
        if !self.limit.is_empty() {
            write!(f, " limit {}", self.limit.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InsertSource {
    /// `values(...)`, one expression per target column.
    Values(Vec<Expr>),
    /// `insert into t select ...`
    Select(Box<SelectStatement>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertStatement {
    /// The target table.
    pub table: String,
    /// Explicit column list; empty means every column in table order.
    pub columns: Vec<String>,
    pub source: InsertSource,
}

/// `column = value` inside `set`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    /// Unqualified column of the updated table.
    pub column: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateStatement {
    pub table: String,
    /// `set` assignments in source order; never empty.
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteStatement {
    pub table: String,
    pub where_clause: Option<Expr>,
}
