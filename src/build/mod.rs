//! Cross-compilation core
//!
//! ## Architecture
//!
//! ```text
//! PlatformSpec ──resolve──▶ [Platform] ─┐
//!                                       ├─▶ Orchestrator ──▶ GoCompiler (per task) ──▶ go build
//! go list ──────────────▶ [entry point] ┘
//! ```
//!
//! ## Modules
//!
//! - `platform` - Supported platform catalog
//! - `resolve` - Platform selection and precedence rules
//! - `overlay` - Per-platform flag overrides from the environment
//! - `template` - Output path templates
//! - `compile` - One `go build` invocation per task
//! - `orchestrator` - Bounded parallel scheduling and failure aggregation

pub mod compile;
pub mod orchestrator;
pub mod overlay;
pub mod platform;
pub mod resolve;
pub mod template;

use overlay::FlagSet;
use template::OutputTemplate;

/// Parallelism value meaning "pick from the CPU count"
pub const AUTO_PARALLELISM: i32 = -1;

/// Validated build configuration shared read-only by every task
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Base linker, compiler and assembler flags
    pub flags: FlagSet,
    /// Output path template
    pub output: OutputTemplate,
    /// Requested parallelism, values below 2 mean automatic
    pub parallel: i32,
    /// Build tags passed to `-tags`
    pub tags: String,
    /// Force cgo on for every target
    pub cgo: bool,
    /// Pass `-a` to force rebuilding
    pub rebuild: bool,
    /// Pass `-race`
    pub race: bool,
    /// The go command to invoke
    pub go_cmd: String,
    /// Value for `-mod`, omitted when empty
    pub mod_mode: String,
    /// Legacy toolchain bootstrap request
    pub build_toolchain: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            flags: FlagSet::default(),
            output: OutputTemplate::default(),
            parallel: AUTO_PARALLELISM,
            tags: String::new(),
            cgo: false,
            rebuild: false,
            race: false,
            go_cmd: "go".to_string(),
            mod_mode: String::new(),
            build_toolchain: false,
        }
    }
}
