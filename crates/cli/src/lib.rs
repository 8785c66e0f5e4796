// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Parallel regression-diff harness.
//!
//! Runs a command line tool over a set of test files, splits each run's
//! combined output into marker-delimited sections, and compares the result
//! against the baseline stored next to the test file. `regrun -u` rewrites
//! the baselines instead.

pub mod classify;
pub mod cli;
pub mod config;
pub mod discover;
pub mod harness;
pub mod logging;
pub mod output_diagnostic;
pub mod pool;
pub mod report;
