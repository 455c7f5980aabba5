//! Abstract syntax tree for the supported statement shapes.

mod expression;
mod statement;

pub use expression::{BinaryExpr, BoolUnaryExpr, Expr, FunctionArg, FunctionCall, Operator};
pub use statement::{
    AliasedColumn, AliasedFunction, Assignment, DeleteStatement, Distinct, InsertSource,
    InsertStatement, JoinClause, SelectColumns, SelectStatement, SortOrder, Statement, Union,
    UpdateStatement,
};
