//! # sqlbind-cli
//!
//! Configuration loading, SQLite validation and the generation run behind
//! the `sqlbind` binary.

pub mod config;
pub mod error;
pub mod validator;

pub use config::{Config, SqlEntry};
pub use error::{CliError, Result};
pub use validator::SqliteValidator;

use sqlbind_core::schema::Schema;
use sqlbind_core::{BatchPolicy, GenerationPlan, Generator};
use tracing::info;

/// Runs the configured default accessors and statements against `schema`.
///
/// # Errors
///
/// Default accessors stop at their first failure. Configured statements
/// follow `policy`; with [`BatchPolicy::CollectAll`] every failure is
/// reported in one [`sqlbind_core::Error::Batch`].
pub fn generate(
    config: &Config,
    schema: &Schema,
    policy: BatchPolicy,
    validator: Option<SqliteValidator>,
) -> Result<GenerationPlan> {
    let entries = config.entries()?;

    let mut generator = Generator::for_schema(schema).with_functions(config.function_registry());
    if let Some(package) = &config.package {
        generator = generator.with_package(package.as_str());
    }
    if let Some(validator) = validator {
        generator = generator.with_validator(validator);
    }

    for table in config.default_tables() {
        let functions = generator.default_functions(table)?;
        info!(table, functions = functions.len(), "default accessors generated");
    }

    generator.process_batch(&entries, policy).into_result()?;
    Ok(generator.finish())
}
