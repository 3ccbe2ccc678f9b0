//! Supported Go target platforms
//!
//! The catalog mirrors `go tool dist list` for the ports gox knows how to
//! drive. Entries flagged as default are built when the user does not name
//! any OS, architecture or pair.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::Serialize;

use crate::error::{hints, GoxError};

/// A cross-compilation target, identified by its `os/arch` pair
///
/// `is_default` is catalog metadata only. Equality and hashing ignore it.
#[derive(Debug, Clone, Serialize)]
pub struct Platform {
    pub os: String,
    pub arch: String,
    #[serde(rename = "default")]
    pub is_default: bool,
}

impl Platform {
    /// Create a non-default platform
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
            is_default: false,
        }
    }

    const fn catalog(os: &'static str, arch: &'static str, is_default: bool) -> CatalogEntry {
        CatalogEntry {
            os,
            arch,
            is_default,
        }
    }

    /// Whether the target OS needs the `.exe` suffix
    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    /// Executable suffix for binaries built for this platform
    pub fn exe_suffix(&self) -> &'static str {
        if self.is_windows() {
            ".exe"
        } else {
            ""
        }
    }

    /// The platform this process runs on, in Go's naming
    pub fn host() -> Option<Self> {
        let os = match std::env::consts::OS {
            "macos" => "darwin",
            "linux" => "linux",
            "windows" => "windows",
            "freebsd" => "freebsd",
            "netbsd" => "netbsd",
            "openbsd" => "openbsd",
            "dragonfly" => "dragonfly",
            "solaris" => "solaris",
            "illumos" => "illumos",
            "android" => "android",
            "ios" => "ios",
            "aix" => "aix",
            _ => return None,
        };

        let little_endian = cfg!(target_endian = "little");
        let arch = match std::env::consts::ARCH {
            "x86" => "386",
            "x86_64" => "amd64",
            "arm" => "arm",
            "aarch64" => "arm64",
            "loongarch64" => "loong64",
            "mips" if little_endian => "mipsle",
            "mips" => "mips",
            "mips64" if little_endian => "mips64le",
            "mips64" => "mips64",
            "powerpc64" if little_endian => "ppc64le",
            "powerpc64" => "ppc64",
            "riscv64" => "riscv64",
            "s390x" => "s390x",
            "wasm32" => "wasm",
            _ => return None,
        };

        Some(Self::new(os, arch))
    }
}

impl PartialEq for Platform {
    fn eq(&self, other: &Self) -> bool {
        self.os == other.os && self.arch == other.arch
    }
}

impl Eq for Platform {}

impl Hash for Platform {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.os.hash(state);
        self.arch.hash(state);
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

impl FromStr for Platform {
    type Err = GoxError;

    /// Parse an `os/arch` pair, lowercasing both halves
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 {
            return Err(GoxError::config_error_with_hint(
                format!("invalid platform syntax: {} should be os/arch", s),
                None,
                hints::osarch_syntax(),
            ));
        }

        Ok(Self::new(parts[0].to_lowercase(), parts[1].to_lowercase()))
    }
}

struct CatalogEntry {
    os: &'static str,
    arch: &'static str,
    is_default: bool,
}

const SUPPORTED: &[CatalogEntry] = &[
    Platform::catalog("aix", "ppc64", false),
    Platform::catalog("android", "386", false),
    Platform::catalog("android", "amd64", false),
    Platform::catalog("android", "arm", false),
    Platform::catalog("android", "arm64", false),
    Platform::catalog("darwin", "amd64", true),
    Platform::catalog("darwin", "arm64", true),
    Platform::catalog("dragonfly", "amd64", false),
    Platform::catalog("freebsd", "386", true),
    Platform::catalog("freebsd", "amd64", true),
    Platform::catalog("freebsd", "arm", true),
    Platform::catalog("freebsd", "arm64", false),
    Platform::catalog("freebsd", "riscv64", false),
    Platform::catalog("illumos", "amd64", false),
    Platform::catalog("ios", "amd64", false),
    Platform::catalog("ios", "arm64", false),
    Platform::catalog("js", "wasm", false),
    Platform::catalog("linux", "386", true),
    Platform::catalog("linux", "amd64", true),
    Platform::catalog("linux", "arm", true),
    Platform::catalog("linux", "arm64", true),
    Platform::catalog("linux", "loong64", false),
    Platform::catalog("linux", "mips", false),
    Platform::catalog("linux", "mips64", false),
    Platform::catalog("linux", "mips64le", false),
    Platform::catalog("linux", "mipsle", false),
    Platform::catalog("linux", "ppc64", false),
    Platform::catalog("linux", "ppc64le", false),
    Platform::catalog("linux", "riscv64", false),
    Platform::catalog("linux", "s390x", true),
    Platform::catalog("netbsd", "386", true),
    Platform::catalog("netbsd", "amd64", true),
    Platform::catalog("netbsd", "arm", true),
    Platform::catalog("netbsd", "arm64", false),
    Platform::catalog("openbsd", "386", true),
    Platform::catalog("openbsd", "amd64", true),
    Platform::catalog("openbsd", "arm", false),
    Platform::catalog("openbsd", "arm64", false),
    Platform::catalog("plan9", "386", false),
    Platform::catalog("plan9", "amd64", false),
    Platform::catalog("plan9", "arm", false),
    Platform::catalog("solaris", "amd64", false),
    Platform::catalog("wasip1", "wasm", false),
    Platform::catalog("windows", "386", true),
    Platform::catalog("windows", "amd64", true),
    Platform::catalog("windows", "arm", false),
    Platform::catalog("windows", "arm64", false),
];

/// The full catalog of supported platforms, in catalog order
pub fn supported_platforms() -> Vec<Platform> {
    SUPPORTED
        .iter()
        .map(|entry| Platform {
            os: entry.os.to_string(),
            arch: entry.arch.to_string(),
            is_default: entry.is_default,
        })
        .collect()
}
