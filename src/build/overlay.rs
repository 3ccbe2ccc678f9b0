//! Per-platform flag overrides from the environment
//!
//! `GOX_<OS>_<ARCH>_LDFLAGS`, `GOX_<OS>_<ARCH>_GCFLAGS` and
//! `GOX_<OS>_<ARCH>_ASMFLAGS` replace the configured flags for one platform.

use super::platform::Platform;

/// Prefix of every override variable
pub const ENV_PREFIX: &str = "GOX";

/// Name of the override variable for a platform and flag kind
pub fn overlay_var(platform: &Platform, suffix: &str) -> String {
    format!(
        "{}_{}_{}_{}",
        ENV_PREFIX, platform.os, platform.arch, suffix
    )
    .to_uppercase()
}

/// Return the override for `platform` if one is set and non-empty, else `base`
pub fn overlay(base: &str, platform: &Platform, suffix: &str) -> String {
    match std::env::var(overlay_var(platform, suffix)) {
        Ok(value) if !value.is_empty() => value,
        _ => base.to_string(),
    }
}

/// The three flag strings that can be overridden per platform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    pub ldflags: String,
    pub gcflags: String,
    pub asmflags: String,
}

impl FlagSet {
    /// Task-local copy of the flags with any overrides for `platform` applied
    pub fn for_platform(&self, platform: &Platform) -> FlagSet {
        FlagSet {
            ldflags: overlay(&self.ldflags, platform, "LDFLAGS"),
            gcflags: overlay(&self.gcflags, platform, "GCFLAGS"),
            asmflags: overlay(&self.asmflags, platform, "ASMFLAGS"),
        }
    }
}
