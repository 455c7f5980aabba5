//! The generation session: slot allocation and the struct registry.

use std::collections::BTreeMap;

use serde::Serialize;

use super::spec::{apply_options, assemble, slot_name, FunctionSpec, Options, StructSource};
use super::SqlValidator;
use crate::error::{Error, Result};
use crate::naming::{pascal_to_snake, snake_to_pascal};
use crate::parser::{parse_sql, FunctionRegistry, ParseContext};
use crate::resolver::lookup_table;
use crate::schema::{Schema, SchemaProvider, Table};

/// A struct field generated from a table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Pascal-cased column name, prefixed with the table in join structs.
    pub name: String,
    /// Table the column belongs to.
    pub table: String,
    pub column: String,
    /// Type name in generated code.
    pub target_type: String,
    pub nullable: bool,
}

/// A record type and the functions filed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructSpec {
    pub name: String,
    /// The table, or joined pair of tables, the struct mirrors.
    pub source: StructSource,
    pub fields: Vec<FieldSpec>,
    /// Committed functions, in commit order.
    pub functions: Vec<FunctionSpec>,
}

/// A prepared-statement slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    /// Position in commit order, starting at 0.
    pub index: usize,
    /// `stmt{index}`
    pub name: String,
    /// The statement text that gets prepared.
    pub sql: String,
}

/// The finished output of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationPlan {
    /// Package the emitter writes into.
    pub package: String,
    /// Structs ordered by name.
    pub structs: Vec<StructSpec>,
    /// Every slot, ordered by index.
    pub slots: Vec<Slot>,
}

fn fields_of(table: &Table, qualified: bool) -> impl Iterator<Item = FieldSpec> + '_ {
    table.columns().iter().map(move |c| FieldSpec {
        name: if qualified {
            format!("{}.{}", snake_to_pascal(&table.name), snake_to_pascal(&c.name))
        } else {
            snake_to_pascal(&c.name)
        },
        table: table.name.clone(),
        column: c.name.clone(),
        target_type: c.target_type.clone(),
        nullable: c.nullable,
    })
}

/// Turns statements into [`FunctionSpec`]s for one schema.
///
/// Analysis ([`Generator::analyze`]) only reads the generator and can run
/// on many threads at once. Committing a function assigns its slot and
/// files it under its struct, which takes `&mut self`, so slots are handed
/// out in commit order by a single writer.
pub struct Generator<'s> {
    schema: &'s dyn SchemaProvider,
    functions: FunctionRegistry,
    validator: Option<Box<dyn SqlValidator>>,
    package: String,
    structs: BTreeMap<String, StructSpec>,
    slots: Vec<Slot>,
}

impl<'s> Generator<'s> {
    /// Creates a generator with the built-in function names.
    #[must_use]
    pub fn new(schema: &'s dyn SchemaProvider, package: impl Into<String>) -> Self {
        Self {
            schema,
            functions: FunctionRegistry::with_builtins(),
            validator: None,
            package: package.into(),
            structs: BTreeMap::new(),
            slots: Vec::new(),
        }
    }

    /// Creates a generator for an in-memory schema, naming the package
    /// after the schema and registering a struct for every table.
    #[must_use]
    pub fn for_schema(schema: &'s Schema) -> Self {
        let mut generator = Self::new(schema, pascal_to_snake(&schema.name));
        for table in &schema.tables {
            generator.insert_table_struct(table);
        }
        generator
    }

    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Replaces the function registry.
    #[must_use]
    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    /// Validates every statement with `validator` before parsing it.
    #[must_use]
    pub fn with_validator(mut self, validator: impl SqlValidator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    #[must_use]
    pub const fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub(crate) const fn schema(&self) -> &'s dyn SchemaProvider {
        self.schema
    }

    #[must_use]
    pub const fn structs(&self) -> &BTreeMap<String, StructSpec> {
        &self.structs
    }

    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Parses and resolves one statement without recording it.
    ///
    /// The returned spec carries the slot it would get if committed now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSql`] when the validator rejects the
    /// statement, and parse or resolution errors otherwise.
    pub fn analyze(&self, sql: &str, options: &Options) -> Result<FunctionSpec> {
        if let Some(validator) = &self.validator {
            validator.validate(sql).map_err(|message| Error::InvalidSql {
                sql: sql.to_string(),
                message,
            })?;
        }
        let ctx = ParseContext::new(&self.functions).with_schema(self.schema);
        let stmt = parse_sql(sql, ctx)?;
        let mut spec = assemble(&stmt, sql, self.schema, &self.functions)?;
        apply_options(&mut spec, options);
        spec.slot = self.slots.len();
        tracing::debug!(
            function = %spec.name,
            verb = stmt.verb(),
            holders = spec.parameters.len(),
            shape = ?spec.result_shape,
            "analyzed statement"
        );
        Ok(spec)
    }

    /// Assigns the next slot to `spec` and files it under its struct.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateFunctionName`] if the struct already has a
    /// function with the same name; nothing is recorded in that case.
    pub fn commit(&mut self, mut spec: FunctionSpec) -> Result<FunctionSpec> {
        self.ensure_struct(&spec.struct_name, &spec.source)?;
        let Some(target) = self.structs.get_mut(&spec.struct_name) else {
            return Err(Error::UnknownTable(spec.struct_name));
        };
        if target.functions.iter().any(|f| f.name == spec.name) {
            return Err(Error::DuplicateFunctionName {
                struct_name: spec.struct_name,
                function: spec.name,
            });
        }

        spec.slot = self.slots.len();
        self.slots.push(Slot {
            index: spec.slot,
            name: slot_name(spec.slot),
            sql: spec.sql.clone(),
        });
        target.functions.push(spec.clone());
        Ok(spec)
    }

    /// Analyzes and commits one statement.
    ///
    /// # Errors
    ///
    /// See [`Generator::analyze`] and [`Generator::commit`].
    pub fn process(&mut self, sql: &str, options: &Options) -> Result<FunctionSpec> {
        let spec = self.analyze(sql, options)?;
        self.commit(spec)
    }

    /// Registers the struct for `table` if it is not known yet.
    ///
    /// # Errors
    ///
    /// Fails if the schema has no such table.
    pub fn add_table_struct(&mut self, table: &str) -> Result<()> {
        let table = lookup_table(self.schema, table)?;
        self.insert_table_struct(table);
        Ok(())
    }

    fn insert_table_struct(&mut self, table: &Table) {
        let name = snake_to_pascal(&table.name);
        self.structs.entry(name.clone()).or_insert_with(|| StructSpec {
            name,
            source: StructSource::Table {
                table: table.name.clone(),
            },
            fields: fields_of(table, false).collect(),
            functions: Vec::new(),
        });
    }

    fn ensure_struct(&mut self, name: &str, source: &StructSource) -> Result<()> {
        if self.structs.contains_key(name) {
            return Ok(());
        }
        match source {
            StructSource::Table { table } => self.add_table_struct(table),
            StructSource::Join { left, right } => {
                self.add_table_struct(left)?;
                self.add_table_struct(right)?;
                let left = lookup_table(self.schema, left)?;
                let right = lookup_table(self.schema, right)?;
                self.structs.insert(
                    name.to_string(),
                    StructSpec {
                        name: name.to_string(),
                        source: source.clone(),
                        fields: fields_of(left, true).chain(fields_of(right, true)).collect(),
                        functions: Vec::new(),
                    },
                );
                Ok(())
            }
        }
    }

    /// A snapshot of everything committed so far.
    #[must_use]
    pub fn plan(&self) -> GenerationPlan {
        GenerationPlan {
            package: self.package.clone(),
            structs: self.structs.values().cloned().collect(),
            slots: self.slots.clone(),
        }
    }

    /// Ends the run and returns the plan.
    #[must_use]
    pub fn finish(self) -> GenerationPlan {
        tracing::info!(
            package = %self.package,
            structs = self.structs.len(),
            slots = self.slots.len(),
            "generation finished"
        );
        GenerationPlan {
            package: self.package,
            structs: self.structs.into_values().collect(),
            slots: self.slots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    fn schema() -> Schema {
        Schema::new("BlogData")
            .with_table(
                Table::new("post")
                    .with_column(Column::new("id", "i64").primary_key())
                    .with_column(Column::new("title", "String")),
            )
            .with_table(
                Table::new("comment")
                    .with_column(Column::new("id", "i64").primary_key())
                    .with_column(Column::new("post_id", "i64")),
            )
    }

    #[test]
    fn slots_follow_commit_order() {
        let schema = schema();
        let mut generator = Generator::for_schema(&schema);
        assert_eq!(generator.package(), "blog_data");

        let first = generator.process("select * from post where id = ?", &Options::default()).unwrap();
        let second = generator.process("delete from post where id = ?", &Options::default()).unwrap();
        assert_eq!((first.slot, second.slot), (0, 1));
        assert_eq!(second.slot_name(), "stmt1");
        assert_eq!(generator.slots()[0].sql, "select id,title from post where id = ?");
    }

    #[test]
    fn analyze_does_not_record() {
        let schema = schema();
        let generator = Generator::for_schema(&schema);
        let spec = generator.analyze("select title from post", &Options::default()).unwrap();
        assert_eq!(spec.slot, 0);
        assert!(generator.slots().is_empty());
        assert!(generator.structs()["Post"].functions.is_empty());
    }

    #[test]
    fn duplicate_function_names_are_rejected() {
        let schema = schema();
        let mut generator = Generator::for_schema(&schema);
        generator.process("select * from post where id = ?", &Options::default()).unwrap();
        let err = generator
            .process("select id, title from post where id = ?", &Options::default())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateFunctionName { ref function, .. } if function == "SelectAllById"));
        assert_eq!(generator.slots().len(), 1);
    }

    #[test]
    fn join_structs_are_created_on_demand() {
        let schema = schema();
        let mut generator = Generator::new(&schema, "blog");
        let spec = generator
            .process(
                "select * from post p join comment c on p.id = c.post_id where p.id = ?",
                &Options::default(),
            )
            .unwrap();
        assert_eq!(spec.struct_name, "PostJoinComment");
        assert_eq!(spec.sql, "select p.id,p.title,c.id,c.post_id from post p join comment c on p.id = c.post_id where p.id = ?");

        let plan = generator.finish();
        let names: Vec<_> = plan.structs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Comment", "Post", "PostJoinComment"]);
        let join = &plan.structs[2];
        assert_eq!(join.fields[3].name, "Comment.PostId");
        assert_eq!(join.functions[0].name, "SelectAllByPostIdEq");
    }

    #[test]
    fn validator_rejections_stop_parsing() {
        let schema = schema();
        let generator = Generator::for_schema(&schema)
            .with_validator(|sql: &str| if sql.contains("drop") { Err("no".to_string()) } else { Ok(()) });
        let err = generator.analyze("drop table post", &Options::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidSql { ref message, .. } if message == "no"));
    }
}
