// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Harness configuration.
//!
//! Values are layered: built-in defaults, then an optional `regrun.toml`,
//! then command line flags and their environment variables.

use crate::cli::Cli;
use crate::pool::{ToolCommand, INPUT_PLACEHOLDER, OUT_DIR_PLACEHOLDER};
use regrun_capture::{DEFAULT_MARKER, DEFAULT_STATE_SUFFIX};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the scan root when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "regrun.toml";
/// Extension of test files picked up by a directory scan.
pub const DEFAULT_EXTENSION: &str = "stig";
/// Default tool under test, relative to the directory regrun runs in.
pub const DEFAULT_PROGRAM: &str = "../../../out/debug/stig/stig";
/// Fixed output directory, so output paths don't differ between runs.
pub const DEFAULT_OUT_DIR: &str = "/tmp/stig_compiler/";

fn default_tool_args() -> Vec<String> {
    vec![
        "-m".to_string(),
        "-d".to_string(),
        INPUT_PLACEHOLDER.to_string(),
        "-o".to_string(),
        OUT_DIR_PLACEHOLDER.to_string(),
    ]
}

/// Whether to compare against baselines or rewrite them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Check,
    Update,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Contents of a `regrun.toml` file. Every key is optional.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Extension of test files, without the dot
    #[serde(default)]
    pub extension: Option<String>,

    /// Section marker literal
    #[serde(default)]
    pub marker: Option<String>,

    /// Suffix of sidecar baseline files
    #[serde(default)]
    pub state_suffix: Option<String>,

    /// Output directory handed to the tool
    #[serde(default)]
    pub out_dir: Option<PathBuf>,

    /// Concurrent tool processes
    #[serde(default)]
    pub workers: Option<usize>,

    /// Relative directories skipped by the scan
    #[serde(default)]
    pub ignore: Vec<PathBuf>,

    /// Tool under test
    #[serde(default)]
    pub tool: Option<ToolSection>,
}

/// `[tool]` table of a config file.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ToolSection {
    #[serde(default)]
    pub program: Option<String>,

    #[serde(default)]
    pub args: Option<Vec<String>>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Everything the harness needs for one run.
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
    pub mode: Mode,
    pub show_changes: bool,
    pub workers: usize,
    pub extension: String,
    pub marker: String,
    pub state_suffix: String,
    pub out_dir: PathBuf,
    pub ignore: Vec<PathBuf>,
    pub tool: ToolCommand,
    pub json_report: Option<PathBuf>,
}

impl HarnessConfig {
    /// Defaults for a scan of `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: Vec::new(),
            mode: Mode::Check,
            show_changes: false,
            workers: num_cpus::get().max(1),
            extension: DEFAULT_EXTENSION.to_string(),
            marker: DEFAULT_MARKER.to_string(),
            state_suffix: DEFAULT_STATE_SUFFIX.to_string(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            ignore: Vec::new(),
            tool: ToolCommand::new(DEFAULT_PROGRAM, default_tool_args()),
            json_report: None,
        }
    }

    /// Build the configuration for a parsed command line.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = Self::new(&cli.root);

        let config_path = cli.config.clone().or_else(|| {
            let candidate = cli.root.join(CONFIG_FILE_NAME);
            candidate.is_file().then_some(candidate)
        });
        if let Some(path) = config_path {
            tracing::debug!(path = %path.display(), "loading config file");
            config.apply_file(ConfigFile::load(&path)?);
        }

        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(extension) = file.extension {
            self.extension = extension;
        }
        if let Some(marker) = file.marker {
            self.marker = marker;
        }
        if let Some(suffix) = file.state_suffix {
            self.state_suffix = suffix;
        }
        if let Some(out_dir) = file.out_dir {
            self.out_dir = out_dir;
        }
        if let Some(workers) = file.workers {
            self.workers = workers;
        }
        self.ignore.extend(file.ignore);
        if let Some(tool) = file.tool {
            if let Some(program) = tool.program {
                self.tool.program = program;
            }
            if let Some(args) = tool.args {
                self.tool.args = args;
            }
        }
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        self.files = cli.filepaths.clone();
        self.mode = if cli.update { Mode::Update } else { Mode::Check };
        self.show_changes = cli.changes;
        if let Some(workers) = cli.worker_count {
            self.workers = workers;
        }
        if let Some(ref program) = cli.program {
            self.tool.program = program.clone();
        }
        if !cli.args.is_empty() {
            self.tool.args = cli.args.clone();
        }
        if let Some(ref out_dir) = cli.out_dir {
            self.out_dir = out_dir.clone();
        }
        if let Some(ref extension) = cli.extension {
            self.extension = extension.clone();
        }
        if let Some(ref marker) = cli.marker {
            self.marker = marker.clone();
        }
        self.ignore.extend(cli.ignore.iter().cloned());
        self.json_report = cli.json_report.clone();
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.marker.is_empty() {
            return Err(ConfigError::Invalid("marker must not be empty".to_string()));
        }
        if self.extension.is_empty() {
            return Err(ConfigError::Invalid(
                "extension must not be empty".to_string(),
            ));
        }
        if self.state_suffix.is_empty() {
            return Err(ConfigError::Invalid(
                "state suffix must not be empty".to_string(),
            ));
        }
        if self.tool.program.is_empty() {
            return Err(ConfigError::Invalid(
                "tool program must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
