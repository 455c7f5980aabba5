//! Schema metadata consulted during parsing and resolution.
//!
//! The schema is loaded once per generation run and only read afterwards,
//! so a single instance can be shared by every worker analyzing statements.

use serde::{Deserialize, Serialize};

/// Read-only access to table metadata.
pub trait SchemaProvider: Sync {
    /// Looks up a table by its exact name.
    fn table(&self, name: &str) -> Option<&Table>;
}

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Type name used for this column in generated code.
    pub target_type: String,
    /// May hold `NULL`.
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
    /// Filled in by the database on insert.
    #[serde(default)]
    pub auto_increment: bool,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_type: target_type.into(),
            nullable: false,
            primary_key: false,
            unique: false,
            auto_increment: false,
        }
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
}

/// A set of columns that is unique only in combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueGroup {
    #[serde(default)]
    pub name: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    /// Multi-column unique constraints.
    #[serde(default)]
    pub unique_groups: Vec<UniqueGroup>,
}

impl Table {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            unique_groups: Vec::new(),
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds a multi-column unique group.
    #[must_use]
    pub fn with_unique_group<S: Into<String>>(
        mut self,
        name: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.unique_groups.push(UniqueGroup {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Gets a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn primary_key(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }

    /// True if `column` belongs to at least one multi-column unique group.
    #[must_use]
    pub fn is_in_unique_group(&self, column: &str) -> bool {
        self.unique_groups
            .iter()
            .any(|g| g.columns.iter().any(|c| c == column))
    }

    /// Multi-column unique groups whose columns all exist, resolved to the
    /// columns themselves.
    #[must_use]
    pub fn complete_unique_groups(&self) -> Vec<Vec<&Column>> {
        self.unique_groups
            .iter()
            .filter(|g| g.columns.len() > 1)
            .filter_map(|g| {
                g.columns
                    .iter()
                    .map(|name| self.column(name))
                    .collect::<Option<Vec<_>>>()
            })
            .collect()
    }
}

/// An in-memory schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub name: String,
    pub tables: Vec<Table>,
}

impl Schema {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }
}

impl SchemaProvider for Schema {
    fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}
