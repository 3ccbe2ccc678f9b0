//! Gox.toml configuration parsing
//!
//! The file is optional. When present it supplies defaults that command-line
//! flags override field by field.
//!
//! ```toml
//! [build]
//! output = "dist/{{.Dir}}_{{.OS}}_{{.Arch}}"
//! parallel = 4
//! ldflags = "-s -w"
//! mod = "readonly"
//!
//! [platforms]
//! os = ["linux", "darwin", "windows"]
//! arch = ["!386"]
//! osarch = ["!windows/arm64"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::build::overlay::FlagSet;
use crate::build::resolve::PlatformSpec;
use crate::build::template::{OutputTemplate, DEFAULT_OUTPUT_TEMPLATE};
use crate::build::{BuildConfig, AUTO_PARALLELISM};
use crate::error::{hints, ResultExt};

/// Root configuration from Gox.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GoxToml {
    /// Build settings
    #[serde(default)]
    pub build: BuildSection,

    /// Platform selection
    #[serde(default)]
    pub platforms: PlatformsSection,
}

/// `[build]` section
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BuildSection {
    pub ldflags: Option<String>,
    pub gcflags: Option<String>,
    pub asmflags: Option<String>,
    /// Output path template
    pub output: Option<String>,
    /// Parallel builds, -1 for automatic
    pub parallel: Option<i32>,
    pub tags: Option<String>,
    pub cgo: Option<bool>,
    pub rebuild: Option<bool>,
    pub race: Option<bool>,
    /// go command to run
    pub gocmd: Option<String>,
    /// Value for go build -mod
    #[serde(rename = "mod")]
    pub mod_mode: Option<String>,
    pub build_toolchain: Option<bool>,
}

/// `[platforms]` section
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlatformsSection {
    #[serde(default)]
    pub os: Vec<String>,
    #[serde(default)]
    pub arch: Vec<String>,
    #[serde(default)]
    pub osarch: Vec<String>,
    pub all: Option<bool>,
}

impl GoxToml {
    /// Default configuration file name
    pub const FILE_NAME: &'static str = "Gox.toml";

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .context_with_hint("Failed to parse Gox.toml", hints::invalid_gox_toml())?;
        Ok(config)
    }

    /// Load the explicit file, or `./Gox.toml` if it exists, or nothing
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        let default_path = PathBuf::from(Self::FILE_NAME);
        if default_path.is_file() {
            return Self::load_from_path(default_path);
        }

        Ok(Self::default())
    }

    /// Layer `overrides` on top of this configuration
    ///
    /// Set fields and non-empty lists in `overrides` win.
    pub fn merge(self, overrides: GoxToml) -> GoxToml {
        let (base, top) = (self.build, overrides.build);
        let build = BuildSection {
            ldflags: top.ldflags.or(base.ldflags),
            gcflags: top.gcflags.or(base.gcflags),
            asmflags: top.asmflags.or(base.asmflags),
            output: top.output.or(base.output),
            parallel: top.parallel.or(base.parallel),
            tags: top.tags.or(base.tags),
            cgo: top.cgo.or(base.cgo),
            rebuild: top.rebuild.or(base.rebuild),
            race: top.race.or(base.race),
            gocmd: top.gocmd.or(base.gocmd),
            mod_mode: top.mod_mode.or(base.mod_mode),
            build_toolchain: top.build_toolchain.or(base.build_toolchain),
        };

        let (base, top) = (self.platforms, overrides.platforms);
        let platforms = PlatformsSection {
            os: prefer_non_empty(top.os, base.os),
            arch: prefer_non_empty(top.arch, base.arch),
            osarch: prefer_non_empty(top.osarch, base.osarch),
            all: top.all.or(base.all),
        };

        GoxToml { build, platforms }
    }

    /// Validate into the build configuration and the platform selection
    pub fn into_build_config(self) -> Result<(BuildConfig, PlatformSpec)> {
        let build = self.build;
        let output = OutputTemplate::parse(
            build.output.as_deref().unwrap_or(DEFAULT_OUTPUT_TEMPLATE),
        )?;

        let config = BuildConfig {
            flags: FlagSet {
                ldflags: build.ldflags.unwrap_or_default(),
                gcflags: build.gcflags.unwrap_or_default(),
                asmflags: build.asmflags.unwrap_or_default(),
            },
            output,
            parallel: build.parallel.unwrap_or(AUTO_PARALLELISM),
            tags: build.tags.unwrap_or_default(),
            cgo: build.cgo.unwrap_or(false),
            rebuild: build.rebuild.unwrap_or(false),
            race: build.race.unwrap_or(false),
            go_cmd: build.gocmd.unwrap_or_else(|| "go".to_string()),
            mod_mode: build.mod_mode.unwrap_or_default(),
            build_toolchain: build.build_toolchain.unwrap_or(false),
        };

        let platforms = self.platforms;
        let spec = PlatformSpec::parse(
            &platforms.os,
            &platforms.arch,
            &platforms.osarch,
            platforms.all.unwrap_or(false),
        )?;

        Ok((config, spec))
    }
}

fn prefer_non_empty(top: Vec<String>, base: Vec<String>) -> Vec<String> {
    if top.is_empty() {
        base
    } else {
        top
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::platform::Platform;
    use crate::error::GoxError;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[build]
output = "dist/{{.Dir}}_{{.OS}}_{{.Arch}}"
parallel = 4
ldflags = "-s -w"
mod = "readonly"
cgo = true

[platforms]
os = ["linux", "darwin"]
arch = ["!386"]
osarch = ["!darwin/amd64"]
"#;

    #[test]
    fn test_parse_sample() {
        let config = GoxToml::parse(SAMPLE).unwrap();
        assert_eq!(config.build.parallel, Some(4));
        assert_eq!(config.build.mod_mode.as_deref(), Some("readonly"));
        assert_eq!(config.platforms.os, vec!["linux", "darwin"]);
        assert_eq!(config.platforms.all, None);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(GoxToml::parse("").unwrap(), GoxToml::default());
    }

    #[test]
    fn test_invalid_toml_has_hint() {
        let err = GoxToml::parse("[build]\nparallel = \"many\"").unwrap_err();
        let gox_err = err.downcast_ref::<GoxError>().unwrap();
        match gox_err {
            GoxError::Config { message, hint, .. } => {
                assert!(message.starts_with("Failed to parse Gox.toml"));
                assert!(hint.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_defaults_into_build_config() {
        let (config, spec) = GoxToml::default().into_build_config().unwrap();
        assert_eq!(config.parallel, AUTO_PARALLELISM);
        assert_eq!(config.go_cmd, "go");
        assert_eq!(config.output.as_str(), DEFAULT_OUTPUT_TEMPLATE);
        assert!(config.mod_mode.is_empty());
        assert_eq!(spec, PlatformSpec::default());
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let file = GoxToml::parse(SAMPLE).unwrap();
        let cli = GoxToml {
            build: BuildSection {
                parallel: Some(8),
                tags: Some("netgo".to_string()),
                ..BuildSection::default()
            },
            platforms: PlatformsSection {
                osarch: vec!["windows/amd64".to_string()],
                ..PlatformsSection::default()
            },
        };

        let (config, spec) = file.merge(cli).into_build_config().unwrap();
        assert_eq!(config.parallel, 8);
        assert_eq!(config.tags, "netgo");
        assert_eq!(config.flags.ldflags, "-s -w");
        assert!(config.cgo);
        assert_eq!(config.mod_mode, "readonly");
        assert_eq!(spec.include_os, vec!["linux", "darwin"]);
        assert_eq!(spec.exclude_arch, vec!["386"]);
        assert_eq!(spec.include_pairs, vec![Platform::new("windows", "amd64")]);
        assert!(spec.exclude_pairs.is_empty());
    }

    #[test]
    fn test_bad_template_is_config_error() {
        let config = GoxToml::parse("[build]\noutput = \"{{.Dir\"").unwrap();
        let err = config.into_build_config().unwrap_err();
        assert!(err.to_string().contains("invalid output template"));
    }

    #[test]
    fn test_bad_pair_is_config_error() {
        let config = GoxToml::parse("[platforms]\nosarch = [\"linux-amd64\"]").unwrap();
        let err = config.into_build_config().unwrap_err();
        assert!(err.to_string().contains("should be os/arch"));
    }

    #[test]
    fn test_discover_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        fs::write(&path, SAMPLE).unwrap();

        let config = GoxToml::discover(Some(&path)).unwrap();
        assert_eq!(config.build.parallel, Some(4));
    }

    #[test]
    fn test_discover_missing_explicit_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.toml");
        assert!(GoxToml::discover(Some(&path)).is_err());
    }
}
