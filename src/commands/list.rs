//! List command implementation

use anyhow::Result;
use clap::Args;

use crate::build::platform::supported_platforms;
use crate::exec::go::{find_go, go_version};

/// Print supported os/arch pairs
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListCommand {
    /// Execute the list command
    pub fn execute(self, _verbose: bool) -> Result<u8> {
        let platforms = supported_platforms();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&platforms)?);
            return Ok(0);
        }

        // The compiler version is informational only
        let version = find_go("go").and_then(|_| go_version("go").ok());
        let subject = match version {
            Some(v) => format!("Supported OS/Arch combinations for {} are shown below.", v),
            None => "Supported OS/Arch combinations are shown below.".to_string(),
        };

        println!(
            "{} The \"default\"\n\
             boolean means that if you don't specify an OS/Arch, it will be\n\
             included by default. If it isn't a default OS/Arch, you must explicitly\n\
             specify that OS/Arch combo for gox to use it.\n",
            subject
        );
        for platform in &platforms {
            println!("{}\t(default: {})", platform, platform.is_default);
        }

        Ok(0)
    }
}
