//! Standard accessors generated for a table without hand-written SQL.

use super::{FunctionSpec, Generator, Options};
use crate::error::Result;
use crate::naming::snake_to_pascal;
use crate::resolver::lookup_table;
use crate::schema::{Column, Table};

fn names(columns: &[&Column]) -> String {
    columns
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn conditions(key: &[&Column]) -> String {
    key.iter()
        .map(|c| format!("{}=?", c.name))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// The default statements for `table` with the overrides they are
/// processed with.
///
/// A paged list and a row count, an insert of every column that is not
/// auto-incremented, and for the primary key, each other unique column and
/// each complete multi-column unique group: a select and an update of the
/// remaining columns and a delete, all keyed on that key.
#[must_use]
pub fn default_statements(table: &Table) -> Vec<(String, Options)> {
    let struct_name = snake_to_pascal(&table.name);
    let mut statements = vec![
        (
            format!("select * from {} limit ?,?", table.name),
            Options::named(format!("{struct_name}List")),
        ),
        (
            format!("select count(*) from {}", table.name),
            Options::named(format!("{struct_name}Count")),
        ),
    ];

    let insertable: Vec<&Column> = table.columns().iter().filter(|c| !c.auto_increment).collect();
    if !insertable.is_empty() {
        let marks = vec!["?"; insertable.len()].join(",");
        statements.push((
            format!("insert into {}({}) values({marks})", table.name, names(&insertable)),
            Options::default(),
        ));
    }

    let mut keys: Vec<Vec<&Column>> = Vec::new();
    let primary_key = table.primary_key();
    if !primary_key.is_empty() {
        keys.push(primary_key);
    }
    keys.extend(
        table
            .columns()
            .iter()
            .filter(|c| c.unique && !c.primary_key)
            .map(|c| vec![c]),
    );
    keys.extend(table.complete_unique_groups());

    for key in keys {
        let rest: Vec<&Column> = table
            .columns()
            .iter()
            .filter(|c| !key.iter().any(|k| k.name == c.name))
            .collect();
        let filter = conditions(&key);
        if !rest.is_empty() {
            statements.push((
                format!("select {} from {} where {filter}", names(&rest), table.name),
                Options::default(),
            ));
        }
        let updatable: Vec<&Column> = rest.iter().copied().filter(|c| !c.auto_increment).collect();
        if !updatable.is_empty() {
            let set = updatable
                .iter()
                .map(|c| format!("{}=?", c.name))
                .collect::<Vec<_>>()
                .join(",");
            statements.push((
                format!("update {} set {set} where {filter}", table.name),
                Options::default(),
            ));
        }
        statements.push((
            format!("delete from {} where {filter}", table.name),
            Options::default(),
        ));
    }
    statements
}

impl Generator<'_> {
    /// Processes the [`default_statements`] of `table`.
    ///
    /// # Errors
    ///
    /// Stops at the first statement that fails, typically a
    /// [`crate::Error::DuplicateFunctionName`] when the defaults were already
    /// generated.
    pub fn default_functions(&mut self, table: &str) -> Result<Vec<FunctionSpec>> {
        let table = lookup_table(self.schema(), table)?;
        let statements = default_statements(table);
        tracing::debug!(
            table = %table.name,
            statements = statements.len(),
            "generating default accessors"
        );
        statements
            .iter()
            .map(|(sql, options)| self.process(sql, options))
            .collect()
    }
}
