// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sectioned tool output and sidecar baselines.
//!
//! This crate holds the data model shared by the regrun harness: the
//! marker-delimited [`Section`]s parsed out of a tool's captured output, the
//! [`TestResult`] pairing them with an exit status, and the
//! [`BaselineStore`] that persists the last accepted result next to each
//! test file.

mod section;
mod store;

pub use section::{parse_sections, Section, TestFile, TestResult, DEFAULT_MARKER};
pub use store::{BaselineError, BaselineStore, DEFAULT_STATE_SUFFIX};
