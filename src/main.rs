// ABOUTME: Entry point for sshort, the SSH alias helper
// ABOUTME: Sets up stderr logging, parses arguments and runs the selected action

mod cli;
mod config;
mod ssh;
mod storage;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    // stdout carries listings and exports, so logs go to stderr
    let filter = EnvFilter::try_from_env("SSHORT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    init_logging();
    let args = cli::Args::parse();
    cli::run(args)
}
