// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sidecar baseline persistence.
//!
//! Each test file `dir/name.ext` keeps its last accepted result in
//! `dir/.name.ext<suffix>`. Writes go through a temporary file in the same
//! directory and are renamed into place, so a reader never observes a
//! half-written baseline.

use crate::section::{Section, TestResult};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Suffix appended to the dot-prefixed file name of a sidecar.
pub const DEFAULT_STATE_SUFFIX: &str = ".test.state";

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum BaselineError {
    #[error("no baseline at {}", .0.display())]
    NotFound(PathBuf),

    #[error("corrupt baseline at {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("baseline I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BaselineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BaselineError::NotFound(_))
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        BaselineError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Serialized form of a sidecar.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SidecarFile {
    format: u32,
    status: i32,
    sections: Vec<Section>,
}

/// Reads and writes sidecar baselines.
#[derive(Clone, Debug)]
pub struct BaselineStore {
    suffix: String,
}

impl BaselineStore {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Sidecar location for a test file.
    pub fn sidecar_path(&self, test_file: &Path) -> PathBuf {
        let name = test_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let sidecar = format!(".{}{}", name, self.suffix);
        match test_file.parent() {
            Some(dir) => dir.join(sidecar),
            None => PathBuf::from(sidecar),
        }
    }

    /// Load the baseline for `test_file`.
    ///
    /// A missing sidecar is reported as [`BaselineError::NotFound`] and is
    /// distinct from every other failure.
    pub fn load(&self, test_file: &Path) -> Result<TestResult, BaselineError> {
        let path = self.sidecar_path(test_file);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BaselineError::NotFound(path))
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                return Err(BaselineError::Corrupt {
                    source: serde::de::Error::custom(e.to_string()),
                    path,
                })
            }
            Err(e) => return Err(BaselineError::io(&path, e)),
        };

        let file: SidecarFile = serde_json::from_str(&content)
            .map_err(|source| BaselineError::Corrupt {
                path: path.clone(),
                source,
            })?;
        if file.format != FORMAT_VERSION {
            return Err(BaselineError::Corrupt {
                source: serde::de::Error::custom(format!(
                    "unsupported format version {}",
                    file.format
                )),
                path,
            });
        }
        Ok(TestResult::new(file.status, file.sections))
    }

    /// Write `result` as the new baseline for `test_file`, replacing any
    /// previous one atomically.
    pub fn save(&self, test_file: &Path, result: &TestResult) -> Result<PathBuf, BaselineError> {
        let path = self.sidecar_path(test_file);
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let file = SidecarFile {
            format: FORMAT_VERSION,
            status: result.status,
            sections: result.sections.clone(),
        };
        let mut json =
            serde_json::to_string_pretty(&file).map_err(|source| BaselineError::Corrupt {
                path: path.clone(),
                source,
            })?;
        json.push('\n');

        let mut temp_file = tempfile::Builder::new()
            .prefix(".regrun-")
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|e| BaselineError::io(&path, e))?;
        temp_file
            .write_all(json.as_bytes())
            .and_then(|()| temp_file.flush())
            .map_err(|e| BaselineError::io(&path, e))?;
        temp_file
            .persist(&path)
            .map_err(|e| BaselineError::io(&path, e.error))?;

        Ok(path)
    }
}

impl Default for BaselineStore {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_SUFFIX)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
