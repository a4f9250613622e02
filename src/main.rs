//! tourcheck CLI - tour validation and reporting
//!
//! Command-line interface over the tourcheck library.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tourcheck::cli::{run_cli, Args};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    debug!(
        version = env!("TOURCHECK_VERSION"),
        git = option_env!("GIT_HASH").unwrap_or("unknown"),
        "starting"
    );

    run_cli(Args::parse())
}
