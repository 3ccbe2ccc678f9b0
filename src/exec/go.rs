//! Adapters around the `go` command
//!
//! gox never compiles anything itself. It asks the go tool which packages
//! are programs, which version it is, and (per task) to build.

use std::path::PathBuf;

use anyhow::{Context, Result};
use semver::{Version, VersionReq};
use which::which;

use super::subprocess::{run_command, RunOptions};
use crate::error::{hints, GoxError};
use crate::utils::terminal::print_warning;

/// Oldest go release that understands `-mod`
const MOD_FLAG_REQUIREMENT: &str = ">=1.11";

/// Locate the go command on PATH (or at the given path)
pub fn find_go(go_cmd: &str) -> Option<PathBuf> {
    which(go_cmd).ok()
}

/// Like `find_go`, but a missing command is a fatal error
pub fn require_go(go_cmd: &str) -> Result<PathBuf> {
    find_go(go_cmd).ok_or_else(|| {
        GoxError::missing_tool(
            go_cmd,
            format!("{} executable must be on the PATH", go_cmd),
            hints::go(),
        )
        .into()
    })
}

/// Import paths of the `main` packages matched by `patterns`
pub fn main_packages(go_cmd: &str, patterns: &[String]) -> Result<Vec<String>> {
    let mut args = vec![
        "list".to_string(),
        "-f".to_string(),
        "{{.Name}}|{{.ImportPath}}".to_string(),
    ];
    args.extend(patterns.iter().cloned());

    let result = run_command(go_cmd, &args, &RunOptions::default())
        .map_err(|e| GoxError::discovery_error("could not run go list", Some(e)))?;

    if !result.success {
        return Err(GoxError::discovery_error(
            format!("{}\nStderr: {}", result.status, result.stderr.trim_end()),
            None,
        )
        .into());
    }

    Ok(parse_main_packages(&result.stdout))
}

/// Parse `go list -f "{{.Name}}|{{.ImportPath}}"` output
pub fn parse_main_packages(output: &str) -> Vec<String> {
    let mut results = Vec::new();

    for line in output.lines() {
        if line.is_empty() {
            continue;
        }

        match line.split_once('|') {
            Some(("main", import_path)) => results.push(import_path.to_string()),
            Some(_) => {}
            None => print_warning(&format!("Bad line reading packages: {}", line)),
        }
    }

    results
}

/// Version token reported by `go version`, e.g. `go1.21.3`
pub fn go_version(go_cmd: &str) -> Result<String> {
    let result = run_command(go_cmd, &["version".to_string()], &RunOptions::default())?;
    if !result.success {
        anyhow::bail!(
            "{} version failed: {}\nStderr: {}",
            go_cmd,
            result.status,
            result.stderr.trim_end()
        );
    }

    parse_version_output(&result.stdout)
        .with_context(|| format!("Unexpected `{} version` output: {}", go_cmd, result.stdout.trim()))
}

/// Extract the version token from `go version go1.21.3 linux/amd64`
pub fn parse_version_output(output: &str) -> Option<String> {
    output
        .split_whitespace()
        .nth(2)
        .map(|token| token.to_string())
}

/// Whether the compiler accepts `-mod`
///
/// Versions that do not start with `go` (development builds) are assumed to
/// support it. A `go`-prefixed version that cannot be parsed is an error.
pub fn supports_mod_flag(version: &str) -> Result<bool> {
    let Some(numeric) = version.strip_prefix("go") else {
        return Ok(true);
    };

    let current = to_semver(numeric).ok_or_else(|| {
        GoxError::version_error(
            format!("Unable to parse current go version: {}", version),
            Some(version.to_string()),
            hints::go_version(),
        )
    })?;

    let requirement = VersionReq::parse(MOD_FLAG_REQUIREMENT)?;
    Ok(requirement.matches(&current))
}

/// `1.21.3` -> 1.21.3, `1.21` -> 1.21.0, `1.22rc1` -> 1.22.0
fn to_semver(numeric: &str) -> Option<Version> {
    let end = numeric
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(numeric.len());
    let mut parts: Vec<u64> = Vec::new();
    for part in numeric[..end].split('.').filter(|p| !p.is_empty()) {
        parts.push(part.parse().ok()?);
    }

    match parts.as_slice() {
        [major] => Some(Version::new(*major, 0, 0)),
        [major, minor] => Some(Version::new(*major, *minor, 0)),
        [major, minor, patch] => Some(Version::new(*major, *minor, *patch)),
        _ => None,
    }
}
