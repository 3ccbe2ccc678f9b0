//! Error types and helpers for user-friendly error messages
//!
//! Fatal errors (bad configuration, missing compiler, unreadable package list)
//! carry an actionable hint. Per-task build failures are not errors in this
//! sense: they are collected by the orchestrator as `TaskFailure` values and
//! reported together at the end of a run.

use thiserror::Error;

/// Custom error types with helpful context and suggestions
#[derive(Error, Debug)]
pub enum GoxError {
    /// Configuration errors (flags, Gox.toml, output template)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },

    /// Tool/executable not found or misconfigured
    #[error("Missing tool: {tool}")]
    MissingTool {
        tool: String,
        required_for: String,
        hint: String,
    },

    /// Listing the packages to build failed
    #[error("Error reading packages: {message}")]
    Discovery {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Compiler version could not be understood
    #[error("Version error: {message}")]
    Version {
        message: String,
        current: Option<String>,
        hint: String,
    },
}

impl GoxError {
    /// Create a configuration error with source and hint
    pub fn config_error_with_hint(
        message: impl Into<String>,
        source: Option<anyhow::Error>,
        hint: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source,
            hint: Some(hint.into()),
        }
    }

    /// Create a missing tool error
    pub fn missing_tool(
        tool: impl Into<String>,
        required_for: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::MissingTool {
            tool: tool.into(),
            required_for: required_for.into(),
            hint: hint.into(),
        }
    }

    /// Create a package discovery error
    pub fn discovery_error(message: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::Discovery {
            message: message.into(),
            source,
        }
    }

    /// Create a version error
    pub fn version_error(
        message: impl Into<String>,
        current: Option<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::Version {
            message: message.into(),
            current,
            hint: hint.into(),
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;

        eprintln!("\n{} {}", style("ERROR:").red().bold(), self);

        match self {
            GoxError::Config { hint, source, .. } => {
                if let Some(src) = source {
                    eprintln!("  {}", src);
                }
                if let Some(h) = hint {
                    eprintln!("\n{} {}", style("HINT:").yellow().bold(), h);
                }
            }
            GoxError::MissingTool {
                required_for, hint, ..
            } => {
                eprintln!("  Required for: {}", required_for);
                eprintln!("\n{} {}", style("HINT:").yellow().bold(), hint);
            }
            GoxError::Discovery { source, .. } => {
                if let Some(src) = source {
                    eprintln!("  {:#}", src);
                }
            }
            GoxError::Version { current, hint, .. } => {
                if let Some(v) = current {
                    eprintln!("  Detected: {}", v);
                }
                eprintln!("\n{} {}", style("HINT:").yellow().bold(), hint);
            }
        }

        eprintln!();
    }
}

/// Print any error returned from a command, using hints for typed errors
pub fn report(err: &anyhow::Error) {
    match err.downcast_ref::<GoxError>() {
        Some(gox_err) => gox_err.display_with_hints(),
        None => crate::utils::terminal::print_error(&format!("{:#}", err)),
    }
}

/// Helper trait for adding hints to Result types
pub trait ResultExt<T> {
    /// Add context with a hint
    fn context_with_hint(
        self,
        context: impl Into<String>,
        hint: impl Into<String>,
    ) -> Result<T, GoxError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context_with_hint(
        self,
        context: impl Into<String>,
        hint: impl Into<String>,
    ) -> Result<T, GoxError> {
        self.map_err(|e| {
            GoxError::config_error_with_hint(format!("{}: {}", context.into(), e), None, hint)
        })
    }
}

/// Common error hints
pub mod hints {
    /// Get hint for a missing Go compiler
    pub fn go() -> &'static str {
        "Install Go from https://go.dev/dl/ or use your package manager:\n\
         • macOS: brew install go\n\
         • Ubuntu: sudo apt install golang-go\n\
         • Windows: winget install GoLang.Go\n\
         \n\
         Or point --gocmd at the go binary you want to use."
    }

    /// Get hint for malformed os/arch pairs
    pub fn osarch_syntax() -> &'static str {
        "Platform pairs are written as os/arch, e.g. \"linux/amd64\".\n\
         Prefix a pair with \"!\" to skip it, e.g. \"!windows/386\".\n\
         Run `gox list` to see every supported pair."
    }

    /// Get hint for an output template that does not parse
    pub fn output_template() -> &'static str {
        "The output template may use {{.Dir}}, {{.OS}} and {{.Arch}}.\n\
         The default is \"{{.Dir}}_{{.OS}}_{{.Arch}}\"."
    }

    /// Get hint for an invalid Gox.toml
    pub fn invalid_gox_toml() -> &'static str {
        "Gox.toml is invalid. Common issues:\n\
         • Unknown value types (parallel must be an integer, cgo a boolean)\n\
         • Invalid TOML syntax (check quotes, brackets, commas)\n\
         • Platform lists must be arrays of strings, e.g. os = [\"linux\", \"!plan9\"]"
    }

    /// Get hint for a compiler version that cannot be parsed
    pub fn go_version() -> &'static str {
        "Check that `go version` prints a version like \"go1.21.3\".\n\
         Pass --mod \"\" to skip the -mod flag check."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = GoxError::config_error_with_hint(
            "invalid platform syntax: linux should be os/arch",
            None,
            hints::osarch_syntax(),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: invalid platform syntax: linux should be os/arch"
        );
    }

    #[test]
    fn test_missing_tool_display() {
        let err = GoxError::missing_tool("go", "cross-compilation", hints::go());
        assert_eq!(err.to_string(), "Missing tool: go");
    }

    #[test]
    fn test_context_with_hint() {
        let parsed: Result<i32, std::num::ParseIntError> = "x".parse::<i32>();
        let err = parsed.context_with_hint("bad number", "use digits").unwrap_err();
        match err {
            GoxError::Config { message, hint, .. } => {
                assert!(message.starts_with("bad number: "));
                assert_eq!(hint.as_deref(), Some("use digits"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
