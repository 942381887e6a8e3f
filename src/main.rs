//! mng - build orchestration front end for qcc
//!
//! Drives the external generator and build tool for two targets, the qcc
//! compiler and its unit test suite, and runs what they produce.
//!
//! ## Architecture
//!
//! ```text
//! Rust CLI → Orchestrator → build/targets → cmake/make (or cc) → qcc, qcc_test
//! ```

mod build;
mod cli;
mod config;
mod error;
mod exec;
mod orchestrator;
mod utils;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use error::MngError;
use utils::terminal::print_error;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return ExitCode::from(cli::report_parse_error(err)),
    };

    init_tracing(cli.verbose);

    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// `-v` forces debug output; otherwise RUST_LOG applies, defaulting to warn
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn report_error(err: &anyhow::Error) {
    match err.chain().find_map(|cause| cause.downcast_ref::<MngError>()) {
        Some(mng_error) => {
            if err.downcast_ref::<MngError>().is_none() {
                print_error(&err.to_string());
            }
            mng_error.display_with_hints();
        }
        None => print_error(&format!("{:#}", err)),
    }
}
