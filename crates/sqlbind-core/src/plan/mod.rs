//! Turning analyzed statements into accessor function specifications.
//!
//! [`Generator`] is the entry point for a generation run. It owns the
//! prepared-statement slot table and the struct registry, and produces a
//! [`GenerationPlan`] for an emitter to render.

mod batch;
mod defaults;
mod generator;
mod spec;

pub use batch::{BatchEntry, BatchFailure, BatchOutcome, BatchPolicy};
pub use defaults::default_statements;
pub use generator::{FieldSpec, GenerationPlan, Generator, Slot, StructSpec};
pub use spec::{FunctionSpec, Options, ResultShape, ScanTarget, StatementKind, StructSource};

/// Checks SQL against a real database engine before it is parsed.
pub trait SqlValidator: Send + Sync {
    /// Returns the engine's message when the statement is rejected.
    ///
    /// # Errors
    ///
    /// The statement is not valid for the target database.
    fn validate(&self, sql: &str) -> Result<(), String>;
}

impl<F> SqlValidator for F
where
    F: Fn(&str) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, sql: &str) -> Result<(), String> {
        self(sql)
    }
}
