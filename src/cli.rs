//! CLI argument parsing using clap derive macros

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{build::BuildCommand, list::ListCommand, version::VersionCommand};

/// gox - cross-compile Go applications in parallel
///
/// Builds every main package for every selected os/arch pair, running
/// several `go build` processes at once.
#[derive(Parser, Debug)]
#[command(name = "gox")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cross-compile packages for the selected platforms
    Build(BuildCommand),

    /// Print supported os/arch pairs
    List(ListCommand),

    /// Print version information
    Version(VersionCommand),
}

impl Cli {
    /// Execute the CLI command, returning the process exit code
    pub fn execute(self) -> Result<u8> {
        // Set up terminal colors
        if self.no_color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        match self.command {
            Commands::Build(cmd) => cmd.execute(self.verbose),
            Commands::List(cmd) => cmd.execute(self.verbose),
            Commands::Version(cmd) => cmd.execute(self.verbose),
        }
    }
}
