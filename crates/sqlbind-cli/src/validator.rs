//! Statement validation against a live SQLite database.

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Executor;
use tokio::runtime::Runtime;
use tracing::debug;

use sqlbind_core::SqlValidator;

use crate::error::{CliError, Result};

/// Prepares every statement on a SQLite connection without running it.
///
/// The validator owns a small runtime so the synchronous generator can call
/// it from its worker threads.
pub struct SqliteValidator {
    runtime: Runtime,
    pool: SqlitePool,
}

impl SqliteValidator {
    /// Connects to `url`, e.g. `sqlite:app.db` or `sqlite::memory:`.
    ///
    /// # Errors
    ///
    /// Fails if the runtime cannot start or the database cannot be opened.
    pub fn connect(url: &str) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;
        let pool = runtime.block_on(
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(url),
        )?;
        debug!(url, "validator connected");
        Ok(Self { runtime, pool })
    }

    /// Runs `sql` for real, for setting up the database.
    ///
    /// # Errors
    ///
    /// Returns the database error.
    pub fn execute(&self, sql: &str) -> Result<u64> {
        let done = self
            .runtime
            .block_on(sqlx::query(sql).execute(&self.pool))?;
        Ok(done.rows_affected())
    }
}

impl SqlValidator for SqliteValidator {
    fn validate(&self, sql: &str) -> std::result::Result<(), String> {
        self.runtime
            .block_on(async { (&self.pool).prepare(sql).await.map(|_| ()) })
            .map_err(|e| e.to_string())
    }
}

impl Drop for SqliteValidator {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}
