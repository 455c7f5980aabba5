//! Generator configuration file.
//!
//! ```json
//! {
//!   "schemaPath": "schema.json",
//!   "package": "store",
//!   "functions": { "json_extract": "String" },
//!   "default": ["user"],
//!   "sql": [
//!     { "sql": "select * from user where email = ?" },
//!     { "tx": "update user set name = ? where id = ?", "func": "Rename" },
//!     { "sql": "select * from user limit ?, ?", "param": ["offset", "count"] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use sqlbind_core::schema::Schema;
use sqlbind_core::{BatchEntry, FunctionRegistry, Options};

use crate::error::{CliError, Result};

/// Parameter name that marks an entry as transactional instead of naming a
/// parameter.
const TX_MARKER: &str = "tx";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Inline schema.
    #[serde(default)]
    pub schema: Option<Schema>,
    /// Schema file, relative to the configuration file.
    #[serde(default)]
    pub schema_path: Option<PathBuf>,
    /// Output package name; defaults to the `snake_case` schema name.
    #[serde(default)]
    pub package: Option<String>,
    /// Extra SQL functions and their return types.
    #[serde(default)]
    pub functions: BTreeMap<String, String>,
    /// Tables that get the default accessors.
    #[serde(default)]
    pub default: Vec<String>,
    #[serde(default)]
    pub sql: Vec<SqlEntry>,
}

/// One configured statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqlEntry {
    /// A plain statement.
    #[serde(default)]
    pub sql: Option<String>,
    /// A statement run inside a transaction.
    #[serde(default)]
    pub tx: Option<String>,
    /// Function name override.
    #[serde(default)]
    pub func: Option<String>,
    /// Parameter name overrides, left to right.
    #[serde(default)]
    pub param: Vec<String>,
}

impl SqlEntry {
    /// Normalizes the entry into what the generator processes.
    ///
    /// Blank parameter names are dropped and a leading `tx` parameter marks
    /// the statement transactional.
    ///
    /// # Errors
    ///
    /// Fails unless exactly one of `sql` and `tx` is set.
    pub fn to_batch_entry(&self, index: usize) -> Result<BatchEntry> {
        let (sql, mut transactional) = match (&self.sql, &self.tx) {
            (Some(sql), None) => (sql, false),
            (None, Some(sql)) => (sql, true),
            (Some(_), Some(_)) => {
                return Err(CliError::InvalidEntry {
                    index,
                    message: "both 'sql' and 'tx' are set".to_string(),
                })
            }
            (None, None) => {
                return Err(CliError::InvalidEntry {
                    index,
                    message: "one of 'sql' or 'tx' is required".to_string(),
                })
            }
        };

        let mut params: Vec<String> = self
            .param
            .iter()
            .map(String::as_str)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        if params.first().is_some_and(|p| p == TX_MARKER) {
            params.remove(0);
            transactional = true;
        }

        let mut options = Options::default().with_params(params);
        options.function_name = self
            .func
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        options.transactional = transactional;
        Ok(BatchEntry::new(sql.trim()).with_options(options))
    }
}

impl Config {
    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid configuration.
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    /// The inline schema, or the one loaded from `schemaPath` resolved
    /// against `base_dir`.
    ///
    /// # Errors
    ///
    /// Fails if no schema is configured or the schema file is unreadable.
    pub fn load_schema(&self, base_dir: &Path) -> Result<Schema> {
        match (&self.schema, &self.schema_path) {
            (Some(schema), _) => Ok(schema.clone()),
            (None, Some(path)) => read_json(&base_dir.join(path)),
            (None, None) => Err(CliError::MissingSchema),
        }
    }

    /// The built-in functions plus the configured ones.
    #[must_use]
    pub fn function_registry(&self) -> FunctionRegistry {
        let mut registry = FunctionRegistry::with_builtins();
        for (name, return_type) in &self.functions {
            registry.register(name, return_type.as_str());
        }
        registry
    }

    /// Tables for default accessors, first occurrence kept.
    #[must_use]
    pub fn default_tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = Vec::new();
        for table in self.default.iter().map(String::as_str).map(str::trim) {
            if !table.is_empty() && !tables.contains(&table) {
                tables.push(table);
            }
        }
        tables
    }

    /// Every `sql` entry, normalized.
    ///
    /// # Errors
    ///
    /// Returns the first malformed entry.
    pub fn entries(&self) -> Result<Vec<BatchEntry>> {
        self.sql
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.to_batch_entry(index))
            .collect()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(json: &str) -> SqlEntry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn tx_key_is_transactional() {
        let batch = entry(r#"{ "tx": "delete from t" }"#).to_batch_entry(0).unwrap();
        assert_eq!(batch.sql, "delete from t");
        assert!(batch.options.transactional);
    }

    #[test]
    fn leading_tx_param_is_a_marker() {
        let batch = entry(r#"{ "sql": "select 1", "param": ["tx", "", " a "] }"#)
            .to_batch_entry(0)
            .unwrap();
        assert!(batch.options.transactional);
        assert_eq!(batch.options.param_names, ["a"]);
    }

    #[test]
    fn tx_later_in_the_list_is_a_name() {
        let batch = entry(r#"{ "sql": "select 1", "param": ["a", "tx"] }"#)
            .to_batch_entry(0)
            .unwrap();
        assert!(!batch.options.transactional);
        assert_eq!(batch.options.param_names, ["a", "tx"]);
    }

    #[test]
    fn blank_function_name_is_ignored() {
        let batch = entry(r#"{ "sql": "select 1", "func": "  " }"#).to_batch_entry(0).unwrap();
        assert_eq!(batch.options.function_name, None);
    }

    #[test]
    fn sql_and_tx_are_exclusive() {
        assert!(matches!(
            entry(r#"{ "sql": "a", "tx": "b" }"#).to_batch_entry(3),
            Err(CliError::InvalidEntry { index: 3, .. })
        ));
        assert!(matches!(
            entry("{}").to_batch_entry(0),
            Err(CliError::InvalidEntry { .. })
        ));
    }

    #[test]
    fn default_tables_are_deduplicated() {
        let config = Config {
            default: vec!["a".into(), "b".into(), "a".into(), " ".into()],
            ..Config::default()
        };
        assert_eq!(config.default_tables(), ["a", "b"]);
    }

    #[test]
    fn configured_functions_extend_the_builtins() {
        let config: Config =
            serde_json::from_str(r#"{ "functions": { "JSON_EXTRACT": "String" } }"#).unwrap();
        let registry = config.function_registry();
        assert_eq!(registry.return_type("json_extract"), Some("String"));
        assert_eq!(registry.return_type("count"), Some("i64"));
    }

    #[test]
    fn missing_schema() {
        assert!(matches!(
            Config::default().load_schema(Path::new(".")),
            Err(CliError::MissingSchema)
        ));
    }
}
