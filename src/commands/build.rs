//! Build command implementation

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::build::compile::GoCompiler;
use crate::build::orchestrator::{effective_parallelism, Orchestrator};
use crate::build::platform::supported_platforms;
use crate::build::resolve::resolve;
use crate::config::{BuildSection, GoxToml, PlatformsSection};
use crate::exec::go::{go_version, main_packages, require_go, supports_mod_flag};
use crate::utils::terminal::{create_progress_bar, print_info, print_success, print_warning};

/// Cross-compile Go packages for many platforms in parallel
///
/// Without --os, --arch or --osarch the default platforms are built
/// (see `gox list`). Prefix any OS, arch or os/arch pair with "!" to skip it.
/// An --osarch pair is built even if its OS or arch is negated elsewhere.
///
/// --ldflags, --gcflags and --asmflags can be overridden per platform with
/// GOX_[OS]_[ARCH]_LDFLAGS, GOX_[OS]_[ARCH]_GCFLAGS and
/// GOX_[OS]_[ARCH]_ASMFLAGS.
#[derive(Args, Debug, Default)]
pub struct BuildCommand {
    /// Packages to build, as accepted by `go list` (default: ".")
    pub packages: Vec<String>,

    /// Operating systems to build for or skip (comma or space separated)
    #[arg(long, value_delimiter = ',')]
    pub os: Vec<String>,

    /// Architectures to build for or skip (comma or space separated)
    #[arg(long, value_delimiter = ',')]
    pub arch: Vec<String>,

    /// os/arch pairs to build for or skip (comma or space separated)
    #[arg(long, value_delimiter = ',')]
    pub osarch: Vec<String>,

    /// Build every supported platform, not just the defaults
    #[arg(long)]
    pub all: bool,

    /// Go build tags
    #[arg(long)]
    pub tags: Option<String>,

    /// Output path template using {{.Dir}}, {{.OS}} and {{.Arch}}
    ///
    /// Default: "{{.Dir}}_{{.OS}}_{{.Arch}}". ".exe" is appended for Windows.
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Number of parallel builds (default: number of CPUs minus one)
    #[arg(long, short = 'j', allow_negative_numbers = true)]
    pub parallel: Option<i32>,

    /// Build cross-compilation toolchain (not needed since Go 1.5)
    #[arg(long)]
    pub build_toolchain: bool,

    /// Set CGO_ENABLED=1 for every target, requires a C cross toolchain
    #[arg(long)]
    pub cgo: bool,

    /// Force rebuilding of packages that are up to date
    #[arg(long)]
    pub rebuild: bool,

    /// Build with the race detector enabled, requires cgo
    #[arg(long)]
    pub race: bool,

    /// Linker flags
    #[arg(long, allow_hyphen_values = true)]
    pub ldflags: Option<String>,

    /// Compiler flags, e.g. all=-trimpath=${GOPATH}
    #[arg(long, allow_hyphen_values = true)]
    pub gcflags: Option<String>,

    /// Assembler flags, e.g. all=-trimpath=${GOPATH}
    #[arg(long, allow_hyphen_values = true)]
    pub asmflags: Option<String>,

    /// go command to run
    #[arg(long)]
    pub gocmd: Option<String>,

    /// Module download mode passed to go build -mod
    #[arg(long = "mod")]
    pub mod_mode: Option<String>,

    /// Configuration file (default: ./Gox.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl BuildCommand {
    /// Flags given on the command line, shaped like a Gox.toml
    fn overrides(&self) -> GoxToml {
        GoxToml {
            build: BuildSection {
                ldflags: self.ldflags.clone(),
                gcflags: self.gcflags.clone(),
                asmflags: self.asmflags.clone(),
                output: self.output.clone(),
                parallel: self.parallel,
                tags: self.tags.clone(),
                cgo: self.cgo.then_some(true),
                rebuild: self.rebuild.then_some(true),
                race: self.race.then_some(true),
                gocmd: self.gocmd.clone(),
                mod_mode: self.mod_mode.clone(),
                build_toolchain: self.build_toolchain.then_some(true),
            },
            platforms: PlatformsSection {
                os: self.os.clone(),
                arch: self.arch.clone(),
                osarch: self.osarch.clone(),
                all: self.all.then_some(true),
            },
        }
    }

    /// Execute the build command, returning the process exit code
    pub fn execute(self, verbose: bool) -> Result<u8> {
        let file = GoxToml::discover(self.config.as_deref())?;
        let (mut config, spec) = file.merge(self.overrides()).into_build_config()?;
        let ceiling = effective_parallelism(config.parallel);

        if config.build_toolchain {
            eprintln!(
                "--build-toolchain is no longer required for Go 1.5 or later.\n\
                 You can start using gox immediately!"
            );
            return Ok(1);
        }

        require_go(&config.go_cmd)?;

        let packages = if self.packages.is_empty() {
            vec![".".to_string()]
        } else {
            self.packages.clone()
        };
        let entry_points = main_packages(&config.go_cmd, &packages)?;

        let platforms = resolve(&spec, &supported_platforms());
        if platforms.is_empty() {
            println!("No valid platforms to build for. If you specified a value");
            println!("for the 'os', 'arch', or 'osarch' flags, make sure you're");
            println!("using a valid value.");
            return Ok(1);
        }

        if !config.mod_mode.is_empty() {
            let version = go_version(&config.go_cmd)?;
            if !supports_mod_flag(&version)? {
                println!("Go compiler version {} does not support the -mod flag", version);
                config.mod_mode.clear();
            }
        }

        if verbose {
            let names: Vec<String> = platforms.iter().map(|p| p.to_string()).collect();
            print_info(&format!("Platforms: {}", names.join(", ")));
            print_info(&format!("Packages: {}", entry_points.join(", ")));
            print_info(&format!("Output: {}", config.output.as_str()));
        }

        if entry_points.is_empty() {
            print_warning(&format!("No main packages found in: {}", packages.join(" ")));
        }

        let total = (platforms.len() * entry_points.len()) as u64;
        let progress = create_progress_bar(total, "Building");
        let compiler = GoCompiler::new(config)
            .with_progress(progress.clone())
            .verbose(verbose);
        let orchestrator = Orchestrator::new(compiler, ceiling).with_progress(progress);

        println!("Number of parallel builds: {}\n", orchestrator.ceiling());
        let report = orchestrator.run(&platforms, &entry_points)?;

        report.print();

        if verbose && report.is_success() {
            print_success(&format!(
                "{} builds finished in {:.2}s",
                report.completed,
                report.duration.as_secs_f64()
            ));
        }

        Ok(report.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        build: BuildCommand,
    }

    fn parse(args: &[&str]) -> BuildCommand {
        let mut argv = vec!["gox"];
        argv.extend_from_slice(args);
        Harness::parse_from(argv).build
    }

    #[test]
    fn test_flags_become_overrides() {
        let cmd = parse(&[
            "--os",
            "linux,!windows",
            "--osarch",
            "darwin/arm64",
            "--parallel",
            "-1",
            "--ldflags",
            "-s -w",
            "--cgo",
            "./cmd/...",
        ]);

        let overrides = cmd.overrides();
        assert_eq!(overrides.platforms.os, vec!["linux", "!windows"]);
        assert_eq!(overrides.platforms.osarch, vec!["darwin/arm64"]);
        assert_eq!(overrides.build.parallel, Some(-1));
        assert_eq!(overrides.build.ldflags.as_deref(), Some("-s -w"));
        assert_eq!(overrides.build.cgo, Some(true));
        assert_eq!(overrides.build.race, None);
        assert_eq!(overrides.platforms.all, None);
        assert_eq!(cmd.packages, vec!["./cmd/..."]);
    }

    #[test]
    fn test_unset_flags_leave_file_values() {
        let file = GoxToml::parse("[build]\nrace = true\ntags = \"netgo\"").unwrap();
        let (config, _) = file
            .merge(parse(&[]).overrides())
            .into_build_config()
            .unwrap();

        assert!(config.race);
        assert_eq!(config.tags, "netgo");
    }
}
