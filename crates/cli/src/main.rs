// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! regrun binary entry point.

use clap::Parser;

use regrun::cli::Cli;
use regrun::config::HarnessConfig;
use regrun::harness::Harness;
use regrun::logging;
use regrun::output_diagnostic::print_error;

/// Exit code after Ctrl-C, as a shell reports SIGINT.
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match HarnessConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            print_error(e);
            std::process::exit(1);
        }
    };

    let harness = Harness::new(config);
    let mut stdout = std::io::stdout().lock();
    match harness.run(&mut stdout).await {
        Ok(_) => Ok(()),
        Err(e) if e.is_interrupted() => {
            print_error("interrupted");
            std::process::exit(EXIT_INTERRUPTED);
        }
        Err(e) => {
            print_error(e);
            std::process::exit(1);
        }
    }
}
