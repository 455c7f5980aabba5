//! Token types produced by the tokenizer.

use serde::Serialize;

use super::Span;

/// The flavour of a `JOIN` keyword, after multi-word merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum JoinKind {
    /// `join`
    Plain,
    /// `inner join`
    Inner,
    /// `left [outer] join`
    Left { outer: bool },
    /// `right [outer] join`
    Right { outer: bool },
    /// `natural join`
    Natural,
    /// `natural left [outer] join`
    NaturalLeft { outer: bool },
    /// `natural right [outer] join`
    NaturalRight { outer: bool },
}

impl JoinKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "join",
            Self::Inner => "inner join",
            Self::Left { outer: false } => "left join",
            Self::Left { outer: true } => "left outer join",
            Self::Right { outer: false } => "right join",
            Self::Right { outer: true } => "right outer join",
            Self::Natural => "natural join",
            Self::NaturalLeft { outer: false } => "natural left join",
            Self::NaturalLeft { outer: true } => "natural left outer join",
            Self::NaturalRight { outer: false } => "natural right join",
            Self::NaturalRight { outer: true } => "natural right outer join",
        }
    }
}

/// Keywords recognised by the grammar, including merged multi-word forms.
///
/// Operator words (`and`, `not in`, `is not`, ...) are keywords too; the
/// expression parser maps them onto [`crate::ast::Operator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Keyword {
    Select,
    All,
    Distinct,
    From,
    As,
    Join(JoinKind),
    On,
    Union,
    UnionAll,
    InsertInto,
    Values,
    Update,
    Set,
    DeleteFrom,
    Where,
    GroupBy,
    OrderBy,
    Having,
    Limit,
    Asc,
    Desc,

    And,
    Or,
    Not,
    In,
    NotIn,
    Like,
    NotLike,
    Is,
    IsNot,
    Between,
    NotBetween,
    Exists,
    NotExists,
}

impl Keyword {
    /// Looks up a single-word keyword (case-insensitive).
    ///
    /// Words that only exist as the head of a compound (`insert`, `group`,
    /// `left`, ...) are not returned here; the tokenizer merges them.
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        let kw = match word.to_ascii_lowercase().as_str() {
            "select" => Self::Select,
            "all" => Self::All,
            "distinct" => Self::Distinct,
            "from" => Self::From,
            "as" => Self::As,
            "join" => Self::Join(JoinKind::Plain),
            "on" => Self::On,
            "union" => Self::Union,
            "values" => Self::Values,
            "update" => Self::Update,
            "set" => Self::Set,
            "where" => Self::Where,
            "having" => Self::Having,
            "limit" => Self::Limit,
            "asc" => Self::Asc,
            "desc" => Self::Desc,
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            "in" => Self::In,
            "like" => Self::Like,
            "is" => Self::Is,
            "between" => Self::Between,
            "exists" => Self::Exists,
            _ => return None,
        };
        Some(kw)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::All => "all",
            Self::Distinct => "distinct",
            Self::From => "from",
            Self::As => "as",
            Self::Join(kind) => kind.as_str(),
            Self::On => "on",
            Self::Union => "union",
            Self::UnionAll => "union all",
            Self::InsertInto => "insert into",
            Self::Values => "values",
            Self::Update => "update",
            Self::Set => "set",
            Self::DeleteFrom => "delete from",
            Self::Where => "where",
            Self::GroupBy => "group by",
            Self::OrderBy => "order by",
            Self::Having => "having",
            Self::Limit => "limit",
            Self::Asc => "asc",
            Self::Desc => "desc",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Like => "like",
            Self::NotLike => "not like",
            Self::Is => "is",
            Self::IsNot => "is not",
            Self::Between => "between",
            Self::NotBetween => "not between",
            Self::Exists => "exists",
            Self::NotExists => "not exists",
        }
    }
}

/// Classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    /// Bare word: a name, `table.column`, a number, `null`, ...
    Identifier,
    /// The bind placeholder `?`.
    Placeholder,
    /// A run of operator symbols such as `>=`, `*` or `<>`.
    Operator,
    Comma,
    Semicolon,
    /// A quoted literal, quotes included.
    Quoted,
    /// A balanced parenthesized group, parens included.
    Group,
    Keyword(Keyword),
}

/// A token: its classification, its text and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    #[must_use]
    pub fn is_operator(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == symbol
    }

    /// Case-insensitive comparison of a bare word.
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text.eq_ignore_ascii_case(word)
    }

    /// The inside of a [`TokenKind::Group`] token and the absolute offset it
    /// starts at.
    #[must_use]
    pub fn group_body(&self) -> Option<(&str, usize)> {
        if self.kind != TokenKind::Group || self.text.len() < 2 {
            return None;
        }
        Some((&self.text[1..self.text.len() - 1], self.span.start + 1))
    }
}
