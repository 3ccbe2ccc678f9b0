//! Version command implementation

use anyhow::Result;
use clap::Args;

use crate::exec::go::{find_go, go_version};

/// Print version information
#[derive(Args, Debug)]
pub struct VersionCommand {
    /// go command whose version is reported alongside
    #[arg(long, default_value = "go")]
    pub gocmd: String,
}

impl VersionCommand {
    /// Execute the version command
    pub fn execute(self, verbose: bool) -> Result<u8> {
        println!("gox v{}", env!("CARGO_PKG_VERSION"));

        if find_go(&self.gocmd).is_some() {
            match go_version(&self.gocmd) {
                Ok(version) => println!("go: {}", version),
                Err(e) if verbose => eprintln!("go: unknown ({:#})", e),
                Err(_) => {}
            }
        }

        Ok(0)
    }
}
