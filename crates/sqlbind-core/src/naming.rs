//! Identifier case conversions used when synthesizing names.
//!
//! Conversions work on ASCII case only; other characters pass through
//! unchanged.

/// `UserId` -> `userId`
#[must_use]
pub fn pascal_to_camel(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// `userId` -> `UserId`
#[must_use]
pub fn camel_to_pascal(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// `UserId` -> `user_id`
///
/// An underscore is inserted before an upper-case letter only when the
/// previous character is a lower-case letter or a digit, so `HTTPCode`
/// becomes `httpcode` and `Page2Size` becomes `page2_size`.
#[must_use]
pub fn pascal_to_snake(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if c.is_ascii_uppercase() {
            if prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit()) {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

/// `user_id` -> `UserId`
///
/// The first character and every character after a single `_` are
/// upper-cased; a trailing `_` is dropped.
#[must_use]
pub fn snake_to_pascal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    if let Some(first) = chars.next() {
        out.push(first.to_ascii_uppercase());
    }
    while let Some(c) = chars.next() {
        if c == '_' {
            match chars.next() {
                Some(next) => out.push(next.to_ascii_uppercase()),
                None => break,
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// `user_id` -> `userId`
#[must_use]
pub fn snake_to_camel(s: &str) -> String {
    pascal_to_camel(&snake_to_pascal(s))
}

/// Concatenates the parts, upper-casing the first letter of each.
#[must_use]
pub fn join_pascal<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .map(|part| camel_to_pascal(part.as_ref()))
        .collect()
}

/// `?`-bound names that do not start like an identifier become `arg`.
#[must_use]
pub fn sanitize(name: &str) -> &str {
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => name,
        _ => "arg",
    }
}
