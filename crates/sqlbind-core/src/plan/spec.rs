//! Function specifications and how a statement is turned into one.

use serde::Serialize;

use crate::ast::{
    AliasedFunction, InsertSource, Operator, SelectColumns, SelectStatement, Statement,
};
use crate::error::{Error, Result};
use crate::naming::{join_pascal, snake_to_pascal};
use crate::parser::FunctionRegistry;
use crate::resolver::{
    assign_names, collect_holders, demote_fields, lookup_table, Clause, Holder, Scope,
};
use crate::schema::{Column, SchemaProvider, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// What a generated function returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultShape {
    /// Statements that only report affected rows.
    None,
    /// One row of aggregate function results.
    Scalar,
    SingleRow,
    RowList,
}

/// The struct a function is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StructSource {
    Table { table: String },
    Join { left: String, right: String },
}

/// One result column and where it is scanned into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanTarget {
    /// Record field, `Table.Column` for join structs.
    pub field: String,
    /// Source table; `None` for function results.
    pub table: Option<String>,
    /// Source column; `None` for function results.
    pub column: Option<String>,
    pub target_type: String,
    pub nullable: bool,
}

/// Everything an emitter needs to render one accessor function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSpec {
    /// Synthesized or overridden function name.
    pub name: String,
    pub kind: StatementKind,
    /// SQL stored in the prepared-statement slot.
    pub sql: String,
    /// Run inside a transaction.
    pub transactional: bool,
    /// Every placeholder, in bind order.
    pub parameters: Vec<Holder>,
    /// Result columns in scan order; empty unless the statement is a select.
    pub scan_targets: Vec<ScanTarget>,
    /// The struct the function is filed under.
    pub struct_name: String,
    pub source: StructSource,
    pub result_shape: ResultShape,
    /// Prepared-statement slot index, assigned at commit.
    pub slot: usize,
}

impl FunctionSpec {
    /// Name of the prepared-statement slot.
    #[must_use]
    pub fn slot_name(&self) -> String {
        slot_name(self.slot)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Holder> {
        self.parameters.iter().filter(|h| h.is_field)
    }

    pub fn params(&self) -> impl Iterator<Item = &Holder> {
        self.parameters.iter().filter(|h| h.is_param())
    }
}

pub fn slot_name(slot: usize) -> String {
    format!("stmt{slot}")
}

/// Caller overrides for one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Replaces the synthesized function name.
    pub function_name: Option<String>,
    /// Replace the names of the free parameters, left to right.
    pub param_names: Vec<String>,
    /// Marks the function transactional.
    pub transactional: bool,
}

impl Options {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            function_name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_params<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.param_names = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn transactional(mut self) -> Self {
        self.transactional = true;
        self
    }
}

pub fn apply_options(spec: &mut FunctionSpec, options: &Options) {
    if let Some(name) = &options.function_name {
        spec.name.clone_from(name);
    }
    let mut names = options.param_names.iter();
    for holder in spec.parameters.iter_mut().filter(|h| h.is_param()) {
        match names.next() {
            Some(name) => holder.name.clone_from(name),
            None => break,
        }
    }
    let unused = names.count();
    if unused > 0 {
        tracing::warn!(
            function = %spec.name,
            unused,
            "more parameter names than parameters; extra names ignored"
        );
    }
    spec.transactional = options.transactional;
}

/// `By` followed by the field names and the Pascal-cased parameter names,
/// or nothing when both are empty.
fn by_clause<'h>(
    fields: impl IntoIterator<Item = &'h Holder>,
    params: impl IntoIterator<Item = &'h Holder>,
) -> String {
    let fields: String = fields.into_iter().map(|h| h.name.as_str()).collect();
    let params = join_pascal(params.into_iter().map(|h| h.name.as_str()));
    if fields.is_empty() && params.is_empty() {
        String::new()
    } else {
        format!("By{fields}{params}")
    }
}

fn params_only(holders: &[Holder]) -> String {
    by_clause([], holders.iter().filter(|h| h.is_param()))
}

fn table_struct(table: &Table) -> (String, StructSource) {
    (
        snake_to_pascal(&table.name),
        StructSource::Table {
            table: table.name.clone(),
        },
    )
}

/// Builds the function for a parsed statement. Slot and overrides are left
/// to the caller.
pub fn assemble(
    stmt: &Statement,
    sql: &str,
    schema: &dyn SchemaProvider,
    functions: &FunctionRegistry,
) -> Result<FunctionSpec> {
    let mut holders = collect_holders(stmt, schema)?;
    let spec = match stmt {
        Statement::Select(select) => {
            return assemble_select(select, sql, schema, functions, holders);
        }
        Statement::Insert(insert) => {
            let table = lookup_table(schema, &insert.table)?;
            assign_names(&mut holders, false);
            let (struct_name, source) = table_struct(table);
            let fields: String = holders
                .iter()
                .filter(|h| h.is_field)
                .map(|h| h.name.as_str())
                .collect();
            let name = match &insert.source {
                InsertSource::Values(_) => format!("Insert{fields}"),
                InsertSource::Select(from) => format!(
                    "Insert{struct_name}{fields}From{}{}",
                    snake_to_pascal(&from.table),
                    params_only(&holders)
                ),
            };
            exec_spec(name, StatementKind::Insert, sql, holders, struct_name, source)
        }
        Statement::Update(update) => {
            let table = lookup_table(schema, &update.table)?;
            assign_names(&mut holders, false);
            let (struct_name, source) = table_struct(table);
            let set: String = holders
                .iter()
                .filter(|h| h.is_field && h.clause == Clause::Set)
                .map(|h| h.name.as_str())
                .collect();
            let by = by_clause(
                holders.iter().filter(|h| h.is_field && h.clause != Clause::Set),
                holders.iter().filter(|h| h.is_param()),
            );
            let name = format!("Update{set}{by}");
            exec_spec(name, StatementKind::Update, sql, holders, struct_name, source)
        }
        Statement::Delete(delete) => {
            let table = lookup_table(schema, &delete.table)?;
            assign_names(&mut holders, false);
            let (struct_name, source) = table_struct(table);
            let name = format!("Delete{}", by_clause(holders.iter().filter(|h| h.is_field), []));
            exec_spec(name, StatementKind::Delete, sql, holders, struct_name, source)
        }
        Statement::Expression(_) => {
            return Err(Error::UnsupportedStatementShape(stmt.verb().to_string()));
        }
    };
    Ok(spec)
}

fn exec_spec(
    name: String,
    kind: StatementKind,
    sql: &str,
    parameters: Vec<Holder>,
    struct_name: String,
    source: StructSource,
) -> FunctionSpec {
    FunctionSpec {
        name,
        kind,
        sql: sql.to_string(),
        transactional: false,
        parameters,
        scan_targets: Vec::new(),
        struct_name,
        source,
        result_shape: ResultShape::None,
        slot: 0,
    }
}

fn assemble_select(
    select: &SelectStatement,
    sql: &str,
    schema: &dyn SchemaProvider,
    functions: &FunctionRegistry,
    mut holders: Vec<Holder>,
) -> Result<FunctionSpec> {
    let scope = Scope::of_select(schema, select)?;
    let table = scope.table;
    let join = scope.join.as_ref().map(|(t, _)| *t);
    let has_join = join.is_some();

    let (struct_name, source) = match join {
        Some(joined) => (
            format!(
                "{}Join{}",
                snake_to_pascal(&table.name),
                snake_to_pascal(&joined.name)
            ),
            StructSource::Join {
                left: table.name.clone(),
                right: joined.name.clone(),
            },
        ),
        None => table_struct(table),
    };

    let mut spec = FunctionSpec {
        name: String::new(),
        kind: StatementKind::Select,
        sql: sql.to_string(),
        transactional: false,
        parameters: Vec::new(),
        scan_targets: Vec::new(),
        struct_name,
        source,
        result_shape: ResultShape::RowList,
        slot: 0,
    };

    if let SelectColumns::Functions(calls) = &select.columns {
        scalar_select(&mut spec, calls, functions, holders, has_join)?;
        return Ok(spec);
    }

    let columns = scan_columns(select, &scope)?;
    let all = columns.len() == table.columns().len() + join.map_or(0, |j| j.columns().len());

    if let Some(joined) = join {
        demote_fields(&mut holders);
        assign_names(&mut holders, true);
        let selected = if all {
            "All".to_string()
        } else {
            joined_selection(&columns, [table, joined])
        };
        spec.name = format!("Select{selected}{}", params_only(&holders));
        spec.scan_targets = columns
            .iter()
            .map(|(t, c)| scan_target(t, c, true))
            .collect();
    } else {
        assign_names(&mut holders, false);
        let selected = if all {
            "All".to_string()
        } else {
            columns.iter().map(|(_, c)| snake_to_pascal(&c.name)).collect()
        };
        if is_single_row(&holders, table) {
            spec.result_shape = ResultShape::SingleRow;
            let by = by_clause(
                holders.iter().filter(|h| h.is_field),
                holders.iter().filter(|h| h.is_param()),
            );
            spec.name = format!("Select{selected}{by}");
        } else {
            demote_fields(&mut holders);
            assign_names(&mut holders, false);
            spec.name = format!("Select{selected}{}", params_only(&holders));
        }
        spec.scan_targets = columns
            .iter()
            .map(|(t, c)| scan_target(t, c, false))
            .collect();
    }
    reject_duplicate_targets(&spec.scan_targets)?;

    if let SelectColumns::Star(span) = select.columns {
        if span.slice(sql) == Some("*") {
            let list = star_list(&columns, &scope);
            spec.sql = format!("{}{list}{}", &sql[..span.start], &sql[span.end..]);
        }
    }

    spec.parameters = holders;
    Ok(spec)
}

/// Selected column names grouped per table, each group led by its table.
fn joined_selection(columns: &[(&Table, &Column)], sides: [&Table; 2]) -> String {
    let mut selected = String::new();
    for side in sides {
        let part: String = columns
            .iter()
            .filter(|(t, _)| std::ptr::eq(*t, side))
            .map(|(_, c)| snake_to_pascal(&c.name))
            .collect();
        if !part.is_empty() {
            selected.push_str(&snake_to_pascal(&side.name));
            selected.push_str(&part);
        }
    }
    selected
}

/// A select of aggregate function calls: one scalar row, every field demoted.
fn scalar_select(
    spec: &mut FunctionSpec,
    calls: &[AliasedFunction],
    functions: &FunctionRegistry,
    mut holders: Vec<Holder>,
    has_join: bool,
) -> Result<()> {
    demote_fields(&mut holders);
    assign_names(&mut holders, has_join);
    let names: Vec<String> = calls
        .iter()
        .map(|f| f.call.name.to_ascii_lowercase())
        .collect();
    spec.scan_targets = calls
        .iter()
        .zip(&names)
        .map(|(f, name)| ScanTarget {
            field: snake_to_pascal(f.alias.as_deref().unwrap_or(name)),
            table: None,
            column: None,
            target_type: functions.return_type(name).unwrap_or("String").to_string(),
            nullable: name != "count",
        })
        .collect();
    reject_duplicate_targets(&spec.scan_targets)?;
    spec.name = format!(
        "Select{}{}{}",
        spec.struct_name,
        join_pascal(names.iter().map(|n| snake_to_pascal(n))),
        params_only(&holders)
    );
    spec.result_shape = ResultShape::Scalar;
    spec.parameters = holders;
    Ok(())
}

/// The explicit column list that replaces `*`, qualified by alias or table
/// name when the select has a join.
fn star_list(columns: &[(&Table, &Column)], scope: &Scope<'_>) -> String {
    let has_join = scope.join.is_some();
    columns
        .iter()
        .map(|(t, c)| {
            if has_join {
                let qualifier = if std::ptr::eq(*t, scope.table) {
                    scope.alias.as_deref()
                } else {
                    scope.join.as_ref().and_then(|(_, alias)| alias.as_deref())
                };
                format!("{}.{}", qualifier.unwrap_or(&t.name), c.name)
            } else {
                c.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Two result columns must never bind the same record field.
fn reject_duplicate_targets(targets: &[ScanTarget]) -> Result<()> {
    for (i, target) in targets.iter().enumerate() {
        if targets[..i].iter().any(|t| t.field == target.field) {
            return Err(Error::DuplicateColumnOrAlias(target.field.clone()));
        }
    }
    Ok(())
}

fn scan_target(table: &Table, column: &Column, qualified: bool) -> ScanTarget {
    let field = if qualified {
        format!("{}.{}", snake_to_pascal(&table.name), snake_to_pascal(&column.name))
    } else {
        snake_to_pascal(&column.name)
    };
    ScanTarget {
        field,
        table: Some(table.name.clone()),
        column: Some(column.name.clone()),
        target_type: column.target_type.clone(),
        nullable: column.nullable,
    }
}

/// The result columns in scan order, with `*` expanded in table order.
fn scan_columns<'a>(
    select: &SelectStatement,
    scope: &Scope<'a>,
) -> Result<Vec<(&'a Table, &'a Column)>> {
    let mut columns: Vec<(&'a Table, &'a Column)> = Vec::new();
    match &select.columns {
        SelectColumns::Star(_) => {
            let tables = std::iter::once(scope.table).chain(scope.join.as_ref().map(|(t, _)| *t));
            for table in tables {
                columns.extend(table.columns().iter().map(|c| (table, c)));
            }
        }
        SelectColumns::Columns(list) => {
            for item in list {
                let (table, column) = scope.resolve(&item.name)?.ok_or_else(|| {
                    let (table, column) = item
                        .name
                        .rsplit_once('.')
                        .unwrap_or((scope.table.name.as_str(), item.name.as_str()));
                    Error::UnknownColumn {
                        table: table.to_string(),
                        column: column.to_string(),
                    }
                })?;
                if columns
                    .iter()
                    .any(|(t, c)| std::ptr::eq(*t, table) && c.name == column.name)
                {
                    return Err(Error::DuplicateColumnOrAlias(item.name.clone()));
                }
                columns.push((table, column));
            }
        }
        SelectColumns::Functions(_) => {}
    }
    Ok(columns)
}

/// A single-table select returns at most one row when an `=` field binds a
/// primary key or unique column, or every column of a multi-column unique
/// group.
fn is_single_row(holders: &[Holder], table: &Table) -> bool {
    let equal: Vec<&Column> = holders
        .iter()
        .filter(|h| h.is_field && h.operator == Some(Operator::Eq))
        .filter_map(|h| h.column.as_deref().and_then(|c| table.column(c)))
        .collect();
    if equal.iter().any(|c| c.primary_key || c.unique) {
        return true;
    }
    table
        .complete_unique_groups()
        .iter()
        .any(|group| group.iter().all(|g| equal.iter().any(|c| c.name == g.name)))
}
