//! SQL function names known to the parser and the types they return.

use std::collections::HashMap;
use std::sync::LazyLock;

const BUILTIN: &[(&str, &str)] = &[
    // aggregate
    ("avg", "f64"),
    ("count", "i64"),
    ("sum", "f64"),
    ("max", "f64"),
    ("min", "f64"),
    // math
    ("abs", "f64"),
    ("sqrt", "f64"),
    ("mod", "i64"),
    ("format", "f64"),
    ("ceil", "i64"),
    ("ceiling", "i64"),
    ("floor", "i64"),
    ("round", "i64"),
    ("pi", "f64"),
    ("sign", "f64"),
    ("pow", "f64"),
    ("power", "f64"),
    ("rand", "f64"),
    ("truncate", "i64"),
    ("sin", "f64"),
    ("asin", "f64"),
    ("cos", "f64"),
    ("acos", "f64"),
    ("tan", "f64"),
    ("atan", "f64"),
    ("cot", "f64"),
    // string
    ("length", "i64"),
    ("concat", "String"),
    ("insert", "String"),
    ("lower", "String"),
    ("upper", "String"),
    ("left", "String"),
    ("right", "String"),
    ("trim", "String"),
    ("ltrim", "String"),
    ("rtrim", "String"),
    ("replace", "String"),
    ("substring", "String"),
    ("reverse", "String"),
    ("repeat", "String"),
    ("strcmp", "i64"),
    // date and time
    ("curdate", "String"),
    ("current_date", "String"),
    ("curtime", "String"),
    ("current_time", "String"),
    ("now", "String"),
    ("sysdate", "String"),
    ("unix_timestamp", "i64"),
    ("from_unixtime", "String"),
    ("month", "i64"),
    ("monthname", "String"),
    ("dayname", "String"),
    ("dayofweek", "i64"),
    ("week", "i64"),
    ("dayofyear", "i64"),
    ("dayofmonth", "i64"),
    ("year", "i64"),
    ("time_to_sec", "i64"),
    ("sec_to_time", "String"),
];

static BUILTIN_REGISTRY: LazyLock<FunctionRegistry> = LazyLock::new(FunctionRegistry::with_builtins);

/// Maps SQL function names (case-insensitive) to the type of their result.
///
/// A name followed by a parenthesized group is only parsed as a function
/// call when the registry knows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionRegistry {
    functions: HashMap<String, String>,
}

impl FunctionRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the common aggregate, math, string and date
    /// functions.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, return_type) in BUILTIN {
            registry.register(*name, *return_type);
        }
        registry
    }

    /// Shared, immutable instance of [`FunctionRegistry::with_builtins`].
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN_REGISTRY
    }

    /// Adds or replaces a function.
    pub fn register(&mut self, name: impl AsRef<str>, return_type: impl Into<String>) {
        self.functions
            .insert(name.as_ref().to_ascii_lowercase(), return_type.into());
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_ascii_lowercase())
    }

    #[must_use]
    pub fn return_type(&self, name: &str) -> Option<&str> {
        self.functions
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
