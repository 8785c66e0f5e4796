// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// Run test files through a tool and diff the output against saved baselines
#[derive(Parser, Debug, Clone)]
#[command(name = "regrun", version, about = "Report changes in tool output")]
pub struct Cli {
    /// Test files to run; defaults to every matching file under --root
    #[arg(value_name = "FILEPATHS")]
    pub filepaths: Vec<PathBuf>,

    /// Update the state files for the given test files
    #[arg(short = 'u', long)]
    pub update: bool,

    /// Print out the changed section bodies
    #[arg(short = 'c', long)]
    pub changes: bool,

    /// Number of concurrent tool processes (default: number of CPUs)
    #[arg(short = 'w', long, env = "REGRUN_WORKERS")]
    pub worker_count: Option<usize>,

    /// Directory scanned for test files when none are given
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// TOML configuration file (default: <root>/regrun.toml if present)
    #[arg(long, env = "REGRUN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Tool under test
    #[arg(long, env = "REGRUN_PROGRAM")]
    pub program: Option<String>,

    /// Tool argument; `{input}` and `{out_dir}` are substituted (repeatable)
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Output directory handed to the tool
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Extension of test files picked up by the directory scan
    #[arg(long)]
    pub extension: Option<String>,

    /// Literal that starts each section in the tool output
    #[arg(long)]
    pub marker: Option<String>,

    /// Relative directory to skip while scanning (repeatable)
    #[arg(long = "ignore", value_name = "REL_PATH")]
    pub ignore: Vec<PathBuf>,

    /// Write a JSON summary of the run to this file
    #[arg(long)]
    pub json_report: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
