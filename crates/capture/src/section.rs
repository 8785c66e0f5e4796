// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Section parsing and the comparable result of one tool run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Marker the tool under test prints in front of each section title.
pub const DEFAULT_MARKER: &str = "MM_NOTICE: ";

/// A test input file, identified by its path relative to the scan root.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestFile(PathBuf);

impl TestFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for TestFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// One marker-delimited fragment of captured output.
///
/// The first line of the fragment is the key; the remaining lines are the
/// body. Sections compare by position, never by key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub key: String,
    #[serde(default)]
    pub body: Vec<String>,
}

impl Section {
    pub fn new(key: impl Into<String>, body: Vec<String>) -> Self {
        Self {
            key: key.into(),
            body,
        }
    }

    /// Build a section from raw fragment text.
    ///
    /// Lines end at `\n`, `\r\n` or a lone `\r`.
    fn from_fragment(fragment: &str) -> Self {
        let normalized = fragment.replace("\r\n", "\n");
        let mut lines = normalized.split_terminator(['\n', '\r']).map(str::to_string);
        let key = lines.next().unwrap_or_default();
        Self {
            key,
            body: lines.collect(),
        }
    }

    /// Body lines joined back into text.
    pub fn body_text(&self) -> String {
        self.body.join("\n")
    }
}

/// Exit status plus parsed sections of one run of the tool under test.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub status: i32,
    pub sections: Vec<Section>,
}

impl TestResult {
    pub fn new(status: i32, sections: Vec<Section>) -> Self {
        Self { status, sections }
    }

    /// Parse captured output into a result.
    pub fn from_output(status: i32, output: &str, marker: &str) -> Self {
        Self::new(status, parse_sections(output, marker))
    }

    pub fn succeeded(&self) -> bool {
        self.status == 0
    }
}

/// Split `raw` on every occurrence of `marker`.
///
/// The marker itself is discarded. Text without any marker yields exactly
/// one section, and an empty fragment yields a section with an empty key.
pub fn parse_sections(raw: &str, marker: &str) -> Vec<Section> {
    if marker.is_empty() {
        return vec![Section::from_fragment(raw)];
    }
    raw.split(marker).map(Section::from_fragment).collect()
}

#[cfg(test)]
#[path = "section_tests.rs"]
mod tests;
