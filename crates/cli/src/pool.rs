// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded pool of tool subprocesses.
//!
//! A single coordinator loop owns every worker task. It dispatches queued
//! tasks into free slots, and it is the only place completion callbacks run,
//! so callbacks never overlap and callers can aggregate without locking.

use regrun_capture::TestFile;
use std::collections::VecDeque;
use std::future::Future;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;
use tokio::task::JoinSet;

/// Placeholder replaced by the test file path in tool arguments.
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder replaced by the output directory in tool arguments.
pub const OUT_DIR_PLACEHOLDER: &str = "{out_dir}";

/// Program and argument template for the tool under test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Arguments with placeholders substituted.
    pub fn render_args(&self, input: &Path, out_dir: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let out_dir = out_dir.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUT_DIR_PLACEHOLDER, &out_dir)
            })
            .collect()
    }
}

/// One unit of work: the test file plus where to find it on disk.
#[derive(Clone, Debug)]
pub struct Task {
    pub file: TestFile,
    pub location: PathBuf,
}

/// Exit status and combined stdout/stderr of a finished tool process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolOutput {
    pub status: i32,
    pub output: String,
}

/// Handle passed to the completion callback once a task's process is gone.
#[derive(Debug)]
pub struct Completion {
    pub file: TestFile,
    pub location: PathBuf,
    pub outcome: Result<ToolOutput, PoolError>,
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while capturing tool output: {0}")]
    Io(#[from] std::io::Error),

    #[error("worker task failed: {0}")]
    Join(String),

    #[error("interrupted")]
    Interrupted,
}

/// Counters describing a finished pool run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub dispatched: usize,
    pub completed: usize,
    pub peak_in_flight: usize,
}

/// Runs the tool under test for each task, at most `workers` at a time.
#[derive(Clone, Debug)]
pub struct WorkerPool {
    workers: usize,
    tool: ToolCommand,
    out_dir: PathBuf,
}

impl WorkerPool {
    pub fn new(workers: usize, tool: ToolCommand, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            workers: workers.max(1),
            tool,
            out_dir: out_dir.into(),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run every task, calling `on_complete` once per task in completion
    /// order. Ctrl-C kills all in-flight processes and returns
    /// [`PoolError::Interrupted`].
    pub async fn run<F>(&self, tasks: Vec<Task>, on_complete: F) -> Result<PoolStats, PoolError>
    where
        F: FnMut(Completion),
    {
        self.run_until(tasks, on_complete, tokio::signal::ctrl_c())
            .await
    }

    /// Like [`WorkerPool::run`], interrupted by `interrupt` instead of Ctrl-C.
    ///
    /// An interrupt future that resolves to an error is treated as one that
    /// never fires.
    pub async fn run_until<F, S>(
        &self,
        tasks: Vec<Task>,
        mut on_complete: F,
        interrupt: S,
    ) -> Result<PoolStats, PoolError>
    where
        F: FnMut(Completion),
        S: Future<Output = std::io::Result<()>>,
    {
        let interrupt = async {
            if interrupt.await.is_err() {
                std::future::pending::<()>().await;
            }
        };
        tokio::pin!(interrupt);

        let mut queue: VecDeque<Task> = tasks.into();
        let mut running = JoinSet::new();
        let mut stats = PoolStats::default();

        loop {
            while running.len() < self.workers {
                let Some(task) = queue.pop_front() else {
                    break;
                };
                let args = self.tool.render_args(&task.location, &self.out_dir);
                tracing::debug!(file = %task.file, "dispatching");
                running.spawn(run_task(task, self.tool.program.clone(), args));
                stats.dispatched += 1;
                stats.peak_in_flight = stats.peak_in_flight.max(running.len());
            }

            if running.is_empty() {
                break;
            }

            tokio::select! {
                joined = running.join_next() => match joined {
                    Some(Ok(completion)) => {
                        stats.completed += 1;
                        tracing::debug!(file = %completion.file, "completed");
                        on_complete(completion);
                    }
                    Some(Err(e)) => {
                        running.shutdown().await;
                        return Err(PoolError::Join(e.to_string()));
                    }
                    None => break,
                },
                () = &mut interrupt => {
                    tracing::warn!(in_flight = running.len(), "interrupted, killing tool processes");
                    running.shutdown().await;
                    return Err(PoolError::Interrupted);
                }
            }
        }

        Ok(stats)
    }
}

async fn run_task(task: Task, program: String, args: Vec<String>) -> Completion {
    let outcome = execute(program, args).await;
    Completion {
        file: task.file,
        location: task.location,
        outcome,
    }
}

/// Spawn one tool process with stdout and stderr sharing a single pipe, then
/// collect everything it writes until it exits.
async fn execute(program: String, args: Vec<String>) -> Result<ToolOutput, PoolError> {
    let (mut reader, writer) = std::io::pipe()?;
    let stderr_writer = writer.try_clone()?;

    // The command owns the parent's copies of the write end; dropping it
    // before reading lets the reader see EOF when the child exits.
    let mut child = {
        let mut command = Command::new(&program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr_writer)
            .kill_on_drop(true);
        command
            .spawn()
            .map_err(|source| PoolError::Spawn { program, source })?
    };

    let capture = tokio::task::spawn_blocking(move || {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).map(|_| buf)
    });

    let status = child.wait().await?;
    let bytes = capture
        .await
        .map_err(|e| PoolError::Join(e.to_string()))??;

    Ok(ToolOutput {
        status: exit_code(status),
        output: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Exit code of a finished process; a signal-killed process reports the
/// negated signal number.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
