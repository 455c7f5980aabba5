//! Expression AST types.

use std::fmt;

use serde::Serialize;

use super::SelectStatement;
use crate::lexer::Keyword;

/// Infix and prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Gt,
    GtEq,
    Lt,
    LtEq,
    /// `<>` or `!=`
    NotEq,
    Eq,
    BitAnd,
    BitOr,
    /// `!`
    Bang,
    /// `&&`
    LogicalAnd,
    /// `||`
    LogicalOr,
    In,
    NotIn,
    Like,
    NotLike,
    Is,
    IsNot,
    And,
    Or,
    Between,
    NotBetween,
    Exists,
    NotExists,
}

impl Operator {
    /// Maps an operator-symbol token onto an operator.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Mod,
            "+" => Self::Add,
            "-" => Self::Sub,
            ">" => Self::Gt,
            ">=" => Self::GtEq,
            "<" => Self::Lt,
            "<=" => Self::LtEq,
            "<>" | "!=" => Self::NotEq,
            "=" => Self::Eq,
            "&" => Self::BitAnd,
            "|" => Self::BitOr,
            "!" => Self::Bang,
            "&&" => Self::LogicalAnd,
            "||" => Self::LogicalOr,
            _ => return None,
        };
        Some(op)
    }

    /// Maps an operator keyword onto an operator.
    #[must_use]
    pub const fn from_keyword(keyword: Keyword) -> Option<Self> {
        let op = match keyword {
            Keyword::In => Self::In,
            Keyword::NotIn => Self::NotIn,
            Keyword::Like => Self::Like,
            Keyword::NotLike => Self::NotLike,
            Keyword::Is => Self::Is,
            Keyword::IsNot => Self::IsNot,
            Keyword::And => Self::And,
            Keyword::Or => Self::Or,
            Keyword::Between => Self::Between,
            Keyword::NotBetween => Self::NotBetween,
            Keyword::Exists => Self::Exists,
            Keyword::NotExists => Self::NotExists,
            _ => return None,
        };
        Some(op)
    }

    /// Binding strength; a lower number binds tighter.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Mul | Self::Div | Self::Mod | Self::Exists | Self::NotExists => 1,
            Self::Add | Self::Sub | Self::Like | Self::NotLike | Self::Is | Self::IsNot => 2,
            Self::Gt | Self::GtEq | Self::Lt | Self::LtEq | Self::NotEq | Self::Eq => 3,
            Self::BitAnd | Self::BitOr | Self::Bang => 4,
            Self::LogicalAnd | Self::LogicalOr | Self::Between | Self::NotBetween => 5,
            Self::In | Self::NotIn => 6,
            Self::And | Self::Or => 7,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::NotEq => "<>",
            Self::Eq => "=",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::Bang => "!",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Like => "like",
            Self::NotLike => "not like",
            Self::Is => "is",
            Self::IsNot => "is not",
            Self::And => "and",
            Self::Or => "or",
            Self::Between => "between",
            Self::NotBetween => "not between",
            Self::Exists => "exists",
            Self::NotExists => "not exists",
        }
    }

    /// Suffix appended to a parameter compared with this operator.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Gt => "Bg",
            Self::GtEq => "BgEq",
            Self::Lt => "Le",
            Self::LtEq => "LeEq",
            Self::NotEq => "NEq",
            Self::Eq => "Eq",
            Self::In => "In",
            Self::NotIn => "NIn",
            Self::Like => "Lk",
            Self::NotLike => "NLk",
            Self::Between => "Bet",
            Self::NotBetween => "NBet",
            Self::Exists => "Ext",
            Self::NotExists => "NExt",
            _ => "",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A SQL expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// A bare name, `table.column`, a literal, or the placeholder `?`.
    Identifier(String),
    Binary(BinaryExpr),
    /// `exists (...)` / `not exists (...)`.
    BoolUnary(BoolUnaryExpr),
    FuncCall(FunctionCall),
    /// A parenthesized comma list.
    List(Vec<Expr>),
    /// A subquery in value position.
    Select(Box<SelectStatement>),
}

/// `left op right`. For `between`, `right` is itself an `and` expression
/// holding the two bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub op: Operator,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoolUnaryExpr {
    pub op: Operator,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCall {
    pub name: String,
    pub arg: FunctionArg,
}

/// What a function call was given.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FunctionArg {
    /// `count(*)`
    Star,
    /// `now()`
    Empty,
    /// One expression, or a [`Expr::List`] for several arguments.
    Expr(Box<Expr>),
}

impl Expr {
    #[must_use]
    pub fn ident(text: impl Into<String>) -> Self {
        Self::Identifier(text.into())
    }

    #[must_use]
    pub fn binary(left: Self, op: Operator, right: Self) -> Self {
        Self::Binary(BinaryExpr {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    /// True for the bare placeholder `?`.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Identifier(text) if text == "?")
    }

    /// The text of an identifier that is not a placeholder.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Identifier(text) if text != "?" => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(text) => f.write_str(text),
            Self::Binary(b) => write!(f, "({} {} {})", b.left, b.op, b.right),
            Self::BoolUnary(u) => write!(f, "{} {}", u.op, u.value),
            Self::FuncCall(call) => write!(f, "{call}"),
            Self::List(items) => write_list(f, items),
            Self::Select(select) => write!(f, "({select})"),
        }
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg {
            FunctionArg::Star => write!(f, "{}(*)", self.name),
            FunctionArg::Empty => write!(f, "{}()", self.name),
            FunctionArg::Expr(arg) => match arg.as_ref() {
                Expr::List(items) => {
                    f.write_str(&self.name)?;
                    write_list(f, items)
                }
                other => write!(f, "{}({other})", self.name),
            },
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    f.write_str("(")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str(")")
}
