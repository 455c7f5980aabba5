//! Processing many statements at once.
//!
//! Statements are analyzed on scoped worker threads, then committed one by
//! one in submission order, so slot numbers and error reporting do not
//! depend on thread timing.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use super::{FunctionSpec, Generator, Options};
use crate::error::{Error, Result};

/// What to do when a statement of a batch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Stop at the first failure in submission order.
    FailFast,
    /// Commit every statement that succeeds and report all failures.
    #[default]
    CollectAll,
}

/// One statement of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchEntry {
    /// One SQL statement.
    pub sql: String,
    /// Naming and transaction overrides for this statement.
    pub options: Options,
}

impl BatchEntry {
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            options: Options::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }
}

/// A statement that could not be turned into a function.
#[derive(Debug)]
pub struct BatchFailure {
    /// Position of the statement in the batch.
    pub index: usize,
    /// The statement as submitted.
    pub sql: String,
    /// Why it was rejected.
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Committed functions in submission order.
    pub committed: Vec<FunctionSpec>,
    /// Rejected statements in submission order.
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// # Errors
    ///
    /// Returns [`Error::Batch`] carrying every failure, if there were any.
    pub fn into_result(self) -> Result<Vec<FunctionSpec>> {
        if self.failures.is_empty() {
            Ok(self.committed)
        } else {
            Err(Error::Batch(self.failures))
        }
    }
}

impl Generator<'_> {
    /// Analyzes `entries` in parallel and commits them in order.
    pub fn process_batch(&mut self, entries: &[BatchEntry], policy: BatchPolicy) -> BatchOutcome {
        let analyzed = self.analyze_all(entries, policy);
        let mut outcome = BatchOutcome::default();

        for (index, (entry, result)) in entries.iter().zip(analyzed).enumerate() {
            // entries skipped after another worker failed are analyzed here
            let result = result.unwrap_or_else(|| self.analyze(&entry.sql, &entry.options));
            match result.and_then(|spec| self.commit(spec)) {
                Ok(spec) => outcome.committed.push(spec),
                Err(error) => {
                    tracing::debug!(index, %error, "statement failed");
                    outcome.failures.push(BatchFailure {
                        index,
                        sql: entry.sql.clone(),
                        error,
                    });
                    if policy == BatchPolicy::FailFast {
                        break;
                    }
                }
            }
        }

        tracing::info!(
            statements = entries.len(),
            committed = outcome.committed.len(),
            failed = outcome.failures.len(),
            "batch processed"
        );
        outcome
    }

    fn analyze_all(
        &self,
        entries: &[BatchEntry],
        policy: BatchPolicy,
    ) -> Vec<Option<Result<FunctionSpec>>> {
        if entries.is_empty() {
            return Vec::new();
        }
        let workers = std::thread::available_parallelism()
            .map_or(1, NonZeroUsize::get)
            .min(entries.len());
        let chunk_size = entries.len().div_ceil(workers);
        let stop = AtomicBool::new(false);

        std::thread::scope(|scope| {
            let handles: Vec<_> = entries
                .chunks(chunk_size)
                .map(|chunk| {
                    let stop = &stop;
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|entry| {
                                if stop.load(Ordering::Relaxed) {
                                    return None;
                                }
                                let result = self.analyze(&entry.sql, &entry.options);
                                if result.is_err() && policy == BatchPolicy::FailFast {
                                    stop.store(true, Ordering::Relaxed);
                                }
                                Some(result)
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        })
    }
}
