//! gox - cross-compile Go applications in parallel
//!
//! Resolves the requested os/arch pairs, asks `go list` for the main
//! packages, then runs one `go build` per (platform, package) with a bounded
//! number running at once.
//!
//! ## Architecture
//!
//! ```text
//! Rust CLI → config/ → build/resolve → build/orchestrator → go build (per task)
//! ```

mod build;
mod cli;
mod commands;
mod config;
mod error;
mod exec;
mod utils;

use std::process::ExitCode;

use clap::Parser;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.execute() {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            error::report(&err);
            ExitCode::FAILURE
        }
    }
}
