//! Tokenizer implementation.

use std::iter::Peekable;
use std::vec::IntoIter;

use super::{JoinKind, Keyword, Span, Token, TokenKind};
use crate::parser::ParseError;

/// Splits SQL text into tokens.
///
/// Parenthesized groups and quoted literals come out as single tokens; the
/// parser re-tokenizes a group's body with [`Lexer::with_offset`] when it
/// needs to look inside. Multi-word keywords (`insert into`, `not in`,
/// `left outer join`, ...) are merged into one token after scanning.
pub struct Lexer<'a> {
    input: &'a str,
    /// Current byte position within `input`.
    pos: usize,
    /// Absolute position of `input[0]` in the original statement.
    offset: usize,
}

const fn is_operator_symbol(b: u8) -> bool {
    matches!(
        b,
        b'+' | b'-' | b'*' | b'/' | b'%' | b'&' | b'|' | b'>' | b'<' | b'!' | b'='
    )
}

const fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

const fn is_quote(b: u8) -> bool {
    matches!(b, b'\'' | b'"' | b'`')
}

const fn ends_word(b: u8) -> bool {
    is_operator_symbol(b)
        || is_space(b)
        || is_quote(b)
        || matches!(b, b',' | b'?' | b';' | b'(' | b')')
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self::with_offset(input, 0)
    }

    /// Creates a lexer whose spans are shifted by `offset`, for text that was
    /// cut out of a larger statement.
    #[must_use]
    pub const fn with_offset(input: &'a str, offset: usize) -> Self {
        Self {
            input,
            pos: 0,
            offset,
        }
    }

    const fn bytes(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    const fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.offset + start, self.offset + end)
    }

    fn token(&self, kind: TokenKind, start: usize, end: usize) -> Token {
        Token::new(kind, &self.input[start..end], self.span(start, end))
    }

    fn skip_spaces(&mut self) {
        while self.bytes().get(self.pos).is_some_and(|b| is_space(*b)) {
            self.pos += 1;
        }
    }

    /// Returns the position just past the closing quote of the literal that
    /// opens at `start`.
    fn quoted_end(&self, start: usize) -> Result<usize, ParseError> {
        let bytes = self.bytes();
        let quote = bytes[start];
        let mut n = start + 1;
        while n < bytes.len() {
            if bytes[n] == b'\\' {
                n += 2;
                continue;
            }
            if bytes[n] == quote {
                // a doubled quote is an escaped quote
                if bytes.get(n + 1) == Some(&quote) {
                    n += 2;
                    continue;
                }
                return Ok(n + 1);
            }
            n += 1;
        }
        Err(ParseError::UnterminatedLiteral {
            span: self.span(start, bytes.len()),
        })
    }

    /// Returns the position just past the `)` matching the `(` at `start`.
    fn group_end(&self, start: usize) -> Result<usize, ParseError> {
        let bytes = self.bytes();
        let mut depth = 0usize;
        let mut n = start;
        while n < bytes.len() {
            match bytes[n] {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(n + 1);
                    }
                }
                b if is_quote(b) => {
                    n = self.quoted_end(n)?;
                    continue;
                }
                _ => {}
            }
            n += 1;
        }
        Err(ParseError::UnbalancedParens {
            span: self.span(start, bytes.len()),
        })
    }

    /// Scans one raw token. Words are all reported as identifiers here.
    fn next_raw(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_spaces();
        let bytes = self.bytes();
        let start = self.pos;
        let Some(&first) = bytes.get(start) else {
            return Ok(None);
        };

        let (kind, end) = match first {
            b if is_operator_symbol(b) => {
                let mut end = start + 1;
                while bytes.get(end).is_some_and(|b| is_operator_symbol(*b)) {
                    end += 1;
                }
                (TokenKind::Operator, end)
            }
            b',' => (TokenKind::Comma, start + 1),
            b';' => (TokenKind::Semicolon, start + 1),
            b'?' => (TokenKind::Placeholder, start + 1),
            b if is_quote(b) => (TokenKind::Quoted, self.quoted_end(start)?),
            b'(' => (TokenKind::Group, self.group_end(start)?),
            b')' => {
                return Err(ParseError::UnbalancedParens {
                    span: self.span(start, start + 1),
                })
            }
            _ => {
                let mut end = start + 1;
                while bytes.get(end).is_some_and(|b| !ends_word(*b)) {
                    end += 1;
                }
                (TokenKind::Identifier, end)
            }
        };

        self.pos = end;
        Ok(Some(self.token(kind, start, end)))
    }

    /// Tokenizes the whole input.
    ///
    /// # Errors
    ///
    /// Fails on an unterminated literal, unbalanced parentheses, or a
    /// multi-word keyword missing its required continuation (`group`
    /// without `by`, `left` without `join`, a stray `outer`).
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut raw = Vec::new();
        while let Some(token) = self.next_raw()? {
            raw.push(token);
        }
        let tokens = merge_compounds(raw)?;
        tracing::trace!(count = tokens.len(), "tokenized");
        Ok(tokens)
    }
}

type Rest = Peekable<IntoIter<Token>>;

/// Folds the next word into `head` if it is one of `words`.
fn absorb(head: &mut Token, rest: &mut Rest, words: &[&str]) -> Option<String> {
    let next = rest.peek()?;
    let word = words.iter().find(|w| next.is_word(w))?;
    let next = rest.next()?;
    head.text.push(' ');
    head.text.push_str(&next.text);
    head.span = head.span.merge(next.span);
    Some((*word).to_string())
}

fn absorb_required(head: &mut Token, rest: &mut Rest, word: &str) -> Result<(), ParseError> {
    if absorb(head, rest, &[word]).is_some() {
        return Ok(());
    }
    let expected = format!("'{word}' after '{}'", head.text);
    Err(match rest.peek() {
        Some(next) => ParseError::UnexpectedToken {
            found: next.text.clone(),
            span: next.span,
            expected,
            trail: vec![head.text.clone()],
        },
        None => ParseError::UnexpectedEof {
            expected,
            span: Span::point(head.span.end),
            trail: vec![head.text.clone()],
        },
    })
}

fn merge_compounds(raw: Vec<Token>) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::with_capacity(raw.len());
    let mut rest = raw.into_iter().peekable();

    while let Some(mut token) = rest.next() {
        if token.kind != TokenKind::Identifier {
            tokens.push(token);
            continue;
        }
        let word = token.text.to_ascii_lowercase();
        // `insert(...)`, `left(...)` and `right(...)` are string functions
        let calls_function = rest.peek().is_some_and(|t| t.kind == TokenKind::Group);

        let keyword = match word.as_str() {
            "insert" | "left" | "right" if calls_function => None,
            "insert" => {
                absorb_required(&mut token, &mut rest, "into")?;
                Some(Keyword::InsertInto)
            }
            "delete" => {
                absorb_required(&mut token, &mut rest, "from")?;
                Some(Keyword::DeleteFrom)
            }
            "is" => Some(if absorb(&mut token, &mut rest, &["not"]).is_some() {
                Keyword::IsNot
            } else {
                Keyword::Is
            }),
            "not" => {
                let next = absorb(&mut token, &mut rest, &["like", "between", "in", "exists"]);
                Some(match next.as_deref() {
                    Some("like") => Keyword::NotLike,
                    Some("between") => Keyword::NotBetween,
                    Some("in") => Keyword::NotIn,
                    Some("exists") => Keyword::NotExists,
                    _ => Keyword::Not,
                })
            }
            "union" => Some(if absorb(&mut token, &mut rest, &["all"]).is_some() {
                Keyword::UnionAll
            } else {
                Keyword::Union
            }),
            "group" => {
                absorb_required(&mut token, &mut rest, "by")?;
                Some(Keyword::GroupBy)
            }
            "order" => {
                absorb_required(&mut token, &mut rest, "by")?;
                Some(Keyword::OrderBy)
            }
            "inner" => {
                absorb_required(&mut token, &mut rest, "join")?;
                Some(Keyword::Join(JoinKind::Inner))
            }
            "left" | "right" => {
                let outer = absorb(&mut token, &mut rest, &["outer"]).is_some();
                absorb_required(&mut token, &mut rest, "join")?;
                Some(Keyword::Join(if word == "left" {
                    JoinKind::Left { outer }
                } else {
                    JoinKind::Right { outer }
                }))
            }
            "natural" => {
                let side = absorb(&mut token, &mut rest, &["left", "right"]);
                let outer = side.is_some() && absorb(&mut token, &mut rest, &["outer"]).is_some();
                absorb_required(&mut token, &mut rest, "join")?;
                Some(Keyword::Join(match side.as_deref() {
                    Some("left") => JoinKind::NaturalLeft { outer },
                    Some(_) => JoinKind::NaturalRight { outer },
                    None => JoinKind::Natural,
                }))
            }
            "outer" => {
                return Err(ParseError::UnexpectedToken {
                    found: token.text,
                    span: token.span,
                    expected: "'left', 'right' or 'natural' before 'outer'".to_string(),
                    trail: tokens
                        .iter()
                        .rev()
                        .take(3)
                        .rev()
                        .map(|t: &Token| t.text.clone())
                        .collect(),
                })
            }
            _ => Keyword::from_word(&word),
        };

        if let Some(keyword) = keyword {
            token.kind = TokenKind::Keyword(keyword);
        }
        tokens.push(token);
    }
    Ok(tokens)
}

/// Tokenizes `sql` from the beginning.
///
/// # Errors
///
/// See [`Lexer::tokenize`].
pub fn tokenize(sql: &str) -> Result<Vec<Token>, ParseError> {
    Lexer::new(sql).tokenize()
}
