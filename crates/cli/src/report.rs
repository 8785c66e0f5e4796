// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Result aggregation and report rendering.

use crate::classify::{Classification, Discrepancy};
use regrun_capture::{Section, TestFile};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

const RULE: &str = "====================================================================";

/// A test file that could not be classified or updated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub file: TestFile,
    pub message: String,
}

/// Aggregate outcome of a run.
///
/// `changed`, `passed` and `failed` are not exclusive: a file can be both
/// changed and failed. All lists keep completion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub changed: Vec<TestFile>,
    pub passed: Vec<TestFile>,
    pub failed: Vec<TestFile>,
    pub errors: Vec<FileError>,
    pub updated: Vec<TestFile>,
}

impl Summary {
    /// Add a classified file to the matching sets.
    pub fn record(&mut self, file: &TestFile, classification: &Classification) {
        if classification.changed && !classification.acceptable() {
            self.changed.push(file.clone());
        }
        if classification.passed {
            self.passed.push(file.clone());
        } else {
            self.failed.push(file.clone());
        }
    }

    pub fn record_error(&mut self, file: &TestFile, message: impl Into<String>) {
        self.errors.push(FileError {
            file: file.clone(),
            message: message.into(),
        });
    }

    /// The tool never ran: counts as failed and as an error.
    pub fn record_spawn_failure(&mut self, file: &TestFile, message: impl Into<String>) {
        self.failed.push(file.clone());
        self.record_error(file, message);
    }

    pub fn record_updated(&mut self, file: &TestFile) {
        self.updated.push(file.clone());
    }

    /// Summary lines for a check run.
    pub fn write_check_report<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "Change: {}", join(&self.changed))?;
        writeln!(w, "Pass: {}", join(&self.passed))?;
        writeln!(w, "Fail: {}", join(&self.failed))?;
        self.write_errors(w)?;
        writeln!(
            w,
            "Overall: {} changed, {} passed, {} failed",
            self.changed.len(),
            self.passed.len(),
            self.failed.len()
        )
    }

    /// Summary lines for an update run.
    pub fn write_update_report<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.write_errors(w)?;
        writeln!(w, "Updated: {} baselines", self.updated.len())
    }

    fn write_errors<W: Write>(&self, w: &mut W) -> io::Result<()> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let listed: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{} ({})", e.file, e.message))
            .collect();
        writeln!(w, "Errors: {}", listed.join(","))
    }

    /// Write the summary as pretty JSON.
    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        let mut json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        json.push('\n');
        std::fs::write(path, json)
    }
}

fn join(files: &[TestFile]) -> String {
    files
        .iter()
        .map(TestFile::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Describe why `file` changed.
///
/// With `show_bodies`, the text of grown and differing sections is included.
pub fn write_changes<W: Write>(
    w: &mut W,
    file: &TestFile,
    classification: &Classification,
    show_bodies: bool,
) -> io::Result<()> {
    if let [Discrepancy::NoBaseline { .. }] = classification.discrepancies.as_slice() {
        return writeln!(w, "No state file: {}", file);
    }

    writeln!(w, "{}", RULE)?;
    writeln!(w, "Changes: {}", file)?;
    for discrepancy in &classification.discrepancies {
        match discrepancy {
            Discrepancy::NoBaseline { .. } => writeln!(w, "No state file: {}", file)?,
            Discrepancy::Extended { section } => {
                writeln!(w, "Further: {}", section.key)?;
                if show_bodies {
                    write_section(w, section)?;
                }
            }
            Discrepancy::Lost { section } => writeln!(w, "Worse: {}", section.key)?,
            Discrepancy::Differs { old, new } => {
                writeln!(w, "Differs: {}", old.key)?;
                if show_bodies {
                    writeln!(w, "Old:")?;
                    write_body(w, old)?;
                    writeln!(w, "New:")?;
                    write_body(w, new)?;
                }
            }
            Discrepancy::StatusChanged { from, to } => {
                writeln!(w, "Return code from {} to {}", from, to)?
            }
        }
    }
    Ok(())
}

fn write_section<W: Write>(w: &mut W, section: &Section) -> io::Result<()> {
    writeln!(w, "{}", section.key)?;
    write_body(w, section)
}

fn write_body<W: Write>(w: &mut W, section: &Section) -> io::Result<()> {
    for line in &section.body {
        writeln!(w, "{}", line)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
