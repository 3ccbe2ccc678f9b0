//! Platform resolution
//!
//! Turns the user's `--os`, `--arch`, `--osarch` and `--all` selections into
//! the ordered list of platforms to build.
//!
//! ## Precedence
//!
//! 1. Explicit `os/arch` pairs replace every other source of candidates.
//! 2. Otherwise an OS list and an arch list together select their cross product.
//! 3. Otherwise an OS list alone selects every catalog entry for those systems.
//! 4. Otherwise the catalog defaults are used (or the whole catalog with `--all`).
//!
//! Candidates missing from the catalog are dropped silently. Exclusions then
//! run over the candidates; explicitly named pairs are immune to OS/arch level
//! exclusion but not to pair level exclusion.

use std::collections::HashSet;

use super::platform::Platform;
use crate::error::GoxError;

const NEGATION: char = '!';

/// The user's platform selection, split into include and exclude sets
///
/// Each list keeps the order the user wrote it in, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformSpec {
    pub include_os: Vec<String>,
    pub exclude_os: Vec<String>,
    pub include_arch: Vec<String>,
    pub exclude_arch: Vec<String>,
    pub include_pairs: Vec<Platform>,
    pub exclude_pairs: Vec<Platform>,
    pub select_all: bool,
}

impl PlatformSpec {
    /// Build a spec from raw flag values
    ///
    /// Every value may hold several tokens separated by spaces or commas.
    /// A leading `!` negates a token.
    pub fn parse<S: AsRef<str>>(
        os: &[S],
        arch: &[S],
        osarch: &[S],
        select_all: bool,
    ) -> Result<Self, GoxError> {
        let mut spec = Self {
            select_all,
            ..Self::default()
        };

        for token in tokens(os) {
            match token.strip_prefix(NEGATION) {
                Some(negated) => push_unique(&mut spec.exclude_os, negated.to_string()),
                None => push_unique(&mut spec.include_os, token.to_string()),
            }
        }

        for token in tokens(arch) {
            match token.strip_prefix(NEGATION) {
                Some(negated) => push_unique(&mut spec.exclude_arch, negated.to_string()),
                None => push_unique(&mut spec.include_arch, token.to_string()),
            }
        }

        for token in tokens(osarch) {
            match token.strip_prefix(NEGATION) {
                Some(negated) => push_unique(&mut spec.exclude_pairs, negated.parse()?),
                None => push_unique(&mut spec.include_pairs, token.parse()?),
            }
        }

        Ok(spec)
    }

    /// Whether the exclusion pass drops this candidate
    fn excludes(&self, platform: &Platform) -> bool {
        if self.exclude_pairs.contains(platform) {
            return true;
        }

        // Explicitly requested pairs skip the component checks
        if self.include_pairs.contains(platform) {
            return false;
        }

        self.exclude_os.contains(&platform.os)
            || self.exclude_arch.contains(&platform.arch)
            || (!self.include_os.is_empty() && !self.include_os.contains(&platform.os))
            || (!self.include_arch.is_empty() && !self.include_arch.contains(&platform.arch))
    }
}

/// Resolve a spec against the catalog
///
/// The result is ordered, has no duplicate pairs, only contains catalog
/// entries, and every returned platform has `is_default` cleared. An empty
/// result is valid and means there is nothing to build.
pub fn resolve(spec: &PlatformSpec, catalog: &[Platform]) -> Vec<Platform> {
    let lookup = |os: &str, arch: &str| catalog.iter().find(|p| p.os == os && p.arch == arch);

    let prefilter: Vec<&Platform> = if !spec.include_pairs.is_empty() {
        spec.include_pairs
            .iter()
            .filter_map(|pair| lookup(pair.os.as_str(), pair.arch.as_str()))
            .collect()
    } else if !spec.include_os.is_empty() && !spec.include_arch.is_empty() {
        spec.include_os
            .iter()
            .flat_map(|os| spec.include_arch.iter().map(move |arch| (os, arch)))
            .filter_map(|(os, arch)| lookup(os.as_str(), arch.as_str()))
            .collect()
    } else if !spec.include_os.is_empty() {
        spec.include_os
            .iter()
            .flat_map(|os| catalog.iter().filter(move |p| &p.os == os))
            .collect()
    } else {
        catalog
            .iter()
            .filter(|p| p.is_default || spec.select_all)
            .collect()
    };

    let mut seen = HashSet::new();
    prefilter
        .into_iter()
        .map(|p| Platform::new(p.os.clone(), p.arch.clone()))
        .filter(|p| seen.insert(p.to_string()))
        .filter(|p| !spec.excludes(p))
        .collect()
}

fn tokens<S: AsRef<str>>(values: &[S]) -> impl Iterator<Item = &str> {
    values
        .iter()
        .flat_map(|v| v.as_ref().split(|c: char| c == ' ' || c == ','))
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != "!")
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, value: T) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::platform::supported_platforms;

    const NONE: &[&str] = &[];

    fn small_catalog() -> Vec<Platform> {
        let mut linux_amd64 = Platform::new("linux", "amd64");
        linux_amd64.is_default = true;
        let mut darwin_amd64 = Platform::new("darwin", "amd64");
        darwin_amd64.is_default = true;
        vec![linux_amd64, Platform::new("linux", "arm64"), darwin_amd64]
    }

    fn keys(platforms: &[Platform]) -> Vec<String> {
        platforms.iter().map(|p| p.to_string()).collect()
    }

    fn make_spec(os: &[&str], arch: &[&str], osarch: &[&str], all: bool) -> PlatformSpec {
        PlatformSpec::parse(os, arch, osarch, all).unwrap()
    }

    #[test]
    fn test_parse_splits_negations() {
        let spec = make_spec(
            &["linux", "!windows"],
            &["amd64,!386"],
            &["darwin/arm64 !linux/arm"],
            true,
        );
        assert_eq!(spec.include_os, vec!["linux"]);
        assert_eq!(spec.exclude_os, vec!["windows"]);
        assert_eq!(spec.include_arch, vec!["amd64"]);
        assert_eq!(spec.exclude_arch, vec!["386"]);
        assert_eq!(spec.include_pairs, vec![Platform::new("darwin", "arm64")]);
        assert_eq!(spec.exclude_pairs, vec![Platform::new("linux", "arm")]);
        assert!(spec.select_all);
    }

    #[test]
    fn test_parse_deduplicates() {
        let spec = make_spec(&["linux", "linux"], NONE, &["linux/amd64", "LINUX/amd64"], false);
        assert_eq!(spec.include_os, vec!["linux"]);
        assert_eq!(spec.include_pairs.len(), 1);
    }

    #[test]
    fn test_parse_rejects_bad_pair() {
        let err = PlatformSpec::parse(NONE, NONE, &["linux"], false).unwrap_err();
        assert!(err.to_string().contains("invalid platform syntax: linux should be os/arch"));
    }

    #[test]
    fn test_empty_spec_selects_defaults() {
        let result = resolve(&PlatformSpec::default(), &small_catalog());
        assert_eq!(keys(&result), vec!["linux/amd64", "darwin/amd64"]);
        assert!(result.iter().all(|p| !p.is_default));
    }

    #[test]
    fn test_select_all_with_arch_exclusion() {
        let spec = make_spec(NONE, &["!amd64"], NONE, true);
        assert_eq!(keys(&resolve(&spec, &small_catalog())), vec!["linux/arm64"]);
    }

    #[test]
    fn test_unknown_pair_resolves_to_nothing() {
        let spec = make_spec(NONE, NONE, &["windows/386"], false);
        assert!(resolve(&spec, &small_catalog()).is_empty());
    }

    #[test]
    fn test_exclude_only_os_uses_defaults() {
        let spec = make_spec(&["!darwin"], NONE, NONE, false);
        assert_eq!(keys(&resolve(&spec, &small_catalog())), vec!["linux/amd64"]);
    }

    #[test]
    fn test_include_os_and_arch_cross_product() {
        let spec = make_spec(&["darwin", "linux"], &["arm64", "amd64"], NONE, false);
        assert_eq!(
            keys(&resolve(&spec, &small_catalog())),
            vec!["darwin/amd64", "linux/arm64", "linux/amd64"]
        );
    }

    #[test]
    fn test_include_os_only_ignores_default_flag() {
        let spec = make_spec(&["linux"], NONE, NONE, false);
        assert_eq!(
            keys(&resolve(&spec, &small_catalog())),
            vec!["linux/amd64", "linux/arm64"]
        );
    }

    #[test]
    fn test_include_arch_only_filters_defaults() {
        let spec = make_spec(NONE, &["arm64"], NONE, false);
        assert!(resolve(&spec, &small_catalog()).is_empty());

        let spec = make_spec(NONE, &["arm64"], NONE, true);
        assert_eq!(keys(&resolve(&spec, &small_catalog())), vec!["linux/arm64"]);
    }

    #[test]
    fn test_explicit_pair_beats_os_exclusion() {
        let spec = make_spec(&["!linux"], NONE, &["linux/arm64"], false);
        assert_eq!(keys(&resolve(&spec, &small_catalog())), vec!["linux/arm64"]);
    }

    #[test]
    fn test_explicit_pairs_replace_component_includes() {
        let spec = make_spec(&["darwin"], &["amd64"], &["linux/arm64"], false);
        assert_eq!(keys(&resolve(&spec, &small_catalog())), vec!["linux/arm64"]);
    }

    #[test]
    fn test_pair_exclusion_wins_over_pair_inclusion() {
        let spec = make_spec(NONE, NONE, &["linux/arm64", "!linux/arm64"], false);
        assert!(resolve(&spec, &small_catalog()).is_empty());
    }

    #[test]
    fn test_same_token_included_and_excluded() {
        let spec = make_spec(&["linux", "!linux"], NONE, NONE, false);
        assert!(resolve(&spec, &small_catalog()).is_empty());
    }

    #[test]
    fn test_excluded_pair_absent_regardless_of_includes() {
        let catalog = supported_platforms();
        let selections: Vec<PlatformSpec> = vec![
            make_spec(NONE, NONE, &["!linux/amd64"], false),
            make_spec(NONE, NONE, &["!linux/amd64"], true),
            make_spec(&["linux"], NONE, &["!linux/amd64"], false),
            make_spec(&["linux"], &["amd64"], &["!linux/amd64"], false),
            make_spec(NONE, NONE, &["linux/amd64", "!linux/amd64"], false),
        ];

        for s in selections {
            let result = resolve(&s, &catalog);
            assert!(
                !result.contains(&Platform::new("linux", "amd64")),
                "linux/amd64 survived {s:?}"
            );
        }
    }

    #[test]
    fn test_output_is_unique_subset_of_catalog() {
        let catalog = supported_platforms();
        let selections: Vec<PlatformSpec> = vec![
            PlatformSpec::default(),
            make_spec(NONE, NONE, NONE, true),
            make_spec(&["linux", "linux", "windows"], NONE, NONE, false),
            make_spec(&["linux", "darwin"], &["amd64", "arm64", "amd64"], NONE, false),
            make_spec(&["linux", "!linux"], &["!386"], NONE, true),
            make_spec(NONE, NONE, &["linux/amd64", "plan9/arm", "nope/nope"], false),
            make_spec(&["!windows"], &["!arm"], NONE, false),
        ];

        for s in selections {
            let result = resolve(&s, &catalog);
            let unique: HashSet<String> = keys(&result).into_iter().collect();
            assert_eq!(unique.len(), result.len(), "duplicates for {s:?}");
            assert!(result.iter().all(|p| catalog.contains(p)), "foreign pair for {s:?}");
        }
    }

    #[test]
    fn test_defaults_match_catalog_flags() {
        let catalog = supported_platforms();
        let defaults: Vec<Platform> = catalog.iter().filter(|p| p.is_default).cloned().collect();

        assert_eq!(resolve(&PlatformSpec::default(), &catalog), defaults);
        assert_eq!(resolve(&make_spec(NONE, NONE, NONE, true), &catalog), catalog);
    }
}
