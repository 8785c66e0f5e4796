// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test file discovery.

use crate::output_diagnostic::print_warning;
use crate::pool::Task;
use regrun_capture::TestFile;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Directories never descended into.
const ALWAYS_IGNORED: &[&str] = &[".git"];

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("scan root {} is not a readable directory: {source}", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to scan {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// The test files of one run and the directory their paths are relative to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestSet {
    pub base: PathBuf,
    pub files: Vec<TestFile>,
}

impl TestSet {
    /// Files exactly as given, relative to the working directory.
    pub fn explicit(paths: &[PathBuf]) -> Self {
        Self {
            base: PathBuf::new(),
            files: paths.iter().cloned().map(TestFile::new).collect(),
        }
    }

    /// Where `file` lives on disk.
    pub fn locate(&self, file: &TestFile) -> PathBuf {
        if self.base.as_os_str().is_empty() || file.path().is_absolute() {
            file.path().to_path_buf()
        } else {
            self.base.join(file.path())
        }
    }

    /// One pool task per file, in set order.
    pub fn tasks(&self) -> Vec<Task> {
        self.files
            .iter()
            .map(|file| Task {
                file: file.clone(),
                location: self.locate(file),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Recursively collect every file under `root` with the given extension.
///
/// Paths are relative to `root` and sorted. Directories whose path relative
/// to `root` is in `ignore` are skipped. Symlinks to files are collected,
/// symlinked directories are not descended into. Failing to read `root`
/// itself is fatal; unreadable entries below it are skipped with a warning.
pub fn scan(root: &Path, extension: &str, ignore: &[PathBuf]) -> Result<TestSet, DiscoveryError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(DiscoveryError::Root {
                path: root.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a directory",
                ),
            })
        }
        Err(source) => {
            return Err(DiscoveryError::Root {
                path: root.to_path_buf(),
                source,
            })
        }
    }

    let extension = extension.trim_start_matches('.');
    let ignored: HashSet<PathBuf> = ignore
        .iter()
        .cloned()
        .chain(ALWAYS_IGNORED.iter().map(PathBuf::from))
        .collect();

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        !entry
            .path()
            .strip_prefix(root)
            .is_ok_and(|rel| ignored.contains(rel))
    });

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(DiscoveryError::Walk {
                    path: root.to_path_buf(),
                    source: e,
                })
            }
            Err(e) => {
                print_warning(format_args!("skipping unreadable entry: {}", e));
                continue;
            }
        };
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }
        if entry.path().extension().is_some_and(|e| e == extension) {
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            files.push(TestFile::new(rel));
        }
    }
    files.sort();

    Ok(TestSet {
        base: root.to_path_buf(),
        files,
    })
}

#[cfg(test)]
#[path = "discover_tests.rs"]
mod tests;
