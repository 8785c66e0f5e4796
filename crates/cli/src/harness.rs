// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Harness driver.
//!
//! Discovers test files, runs them through the worker pool and, depending on
//! the mode, either rewrites their baselines or classifies them against the
//! existing ones.

use crate::classify::classify;
use crate::config::{HarnessConfig, Mode};
use crate::discover::{scan, DiscoveryError, TestSet};
use crate::pool::{Completion, PoolError, WorkerPool};
use crate::report::{write_changes, Summary};
use regrun_capture::{BaselineStore, TestResult};
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Status recorded for a test file whose tool process could not start.
pub const SPAWN_FAILURE_STATUS: i32 = 127;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("failed to create output directory {}: {source}", path.display())]
    OutDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report: {0}")]
    Report(#[source] std::io::Error),
}

impl HarnessError {
    pub fn is_interrupted(&self) -> bool {
        matches!(self, HarnessError::Pool(PoolError::Interrupted))
    }
}

/// Drives one regression run.
pub struct Harness {
    config: HarnessConfig,
    store: BaselineStore,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        let store = BaselineStore::new(config.state_suffix.clone());
        Self { config, store }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// The explicit file list if one was given, otherwise a scan of the root.
    pub fn discover(&self) -> Result<TestSet, DiscoveryError> {
        if self.config.files.is_empty() {
            scan(&self.config.root, &self.config.extension, &self.config.ignore)
        } else {
            Ok(TestSet::explicit(&self.config.files))
        }
    }

    /// Run every test file, writing progress and the final report to `out`.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<Summary, HarnessError> {
        self.run_until(out, tokio::signal::ctrl_c()).await
    }

    /// Like [`Harness::run`], interrupted by `interrupt` instead of Ctrl-C.
    pub async fn run_until<W, S>(&self, out: &mut W, interrupt: S) -> Result<Summary, HarnessError>
    where
        W: Write,
        S: Future<Output = std::io::Result<()>>,
    {
        let set = self.discover()?;
        tracing::info!(files = set.len(), mode = ?self.config.mode, "discovered test files");

        std::fs::create_dir_all(&self.config.out_dir).map_err(|source| HarnessError::OutDir {
            path: self.config.out_dir.clone(),
            source,
        })?;

        let pool = WorkerPool::new(
            self.config.workers,
            self.config.tool.clone(),
            &self.config.out_dir,
        );
        let mut summary = Summary::default();
        let mut write_error = None;
        let stats = pool
            .run_until(
                set.tasks(),
                |completion| {
                    if let Err(e) = self.complete(completion, &mut summary, out) {
                        tracing::warn!(error = %e, "failed to write change report");
                        write_error.get_or_insert(e);
                    }
                },
                interrupt,
            )
            .await?;
        tracing::debug!(?stats, "pool finished");
        if let Some(e) = write_error {
            return Err(HarnessError::Report(e));
        }

        match self.config.mode {
            Mode::Check => summary.write_check_report(out),
            Mode::Update => summary.write_update_report(out),
        }
        .map_err(HarnessError::Report)?;

        if let Some(ref path) = self.config.json_report {
            summary.write_json(path).map_err(HarnessError::Report)?;
        }

        Ok(summary)
    }

    /// Handle one finished tool process.
    ///
    /// A tool that never started is classified as an empty run with
    /// [`SPAWN_FAILURE_STATUS`]. Only writing the change report can fail.
    fn complete<W: Write>(
        &self,
        completion: Completion,
        summary: &mut Summary,
        out: &mut W,
    ) -> std::io::Result<()> {
        let Completion {
            file,
            location,
            outcome,
        } = completion;

        let (result, spawn_error) = match outcome {
            Ok(output) => (
                TestResult::from_output(output.status, &output.output, &self.config.marker),
                None,
            ),
            Err(e) => {
                tracing::warn!(file = %file, error = %e, status = SPAWN_FAILURE_STATUS, "tool did not run");
                (
                    TestResult::new(SPAWN_FAILURE_STATUS, Vec::new()),
                    Some(e.to_string()),
                )
            }
        };

        match self.config.mode {
            Mode::Update => {
                if let Some(message) = spawn_error {
                    summary.record_spawn_failure(&file, message);
                    return Ok(());
                }
                match self.store.save(&location, &result) {
                    Ok(path) => {
                        tracing::debug!(file = %file, sidecar = %path.display(), "baseline written");
                        summary.record_updated(&file);
                    }
                    Err(e) => summary.record_error(&file, e.to_string()),
                }
            }
            Mode::Check => {
                let baseline = match self.store.load(&location) {
                    Ok(baseline) => Some(baseline),
                    Err(e) if e.is_not_found() => None,
                    Err(e) => {
                        summary.record_error(&file, e.to_string());
                        if let Some(message) = spawn_error {
                            summary.record_spawn_failure(&file, message);
                        }
                        return Ok(());
                    }
                };

                let classification = classify(&result, baseline.as_ref());
                summary.record(&file, &classification);
                if let Some(message) = spawn_error {
                    summary.record_error(&file, message);
                }
                if classification.changed {
                    write_changes(out, &file, &classification, self.config.show_changes)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "harness_tests.rs"]
mod tests;
