// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Version tag parsing and ordering.
//!
//! Version directories are named after Composer version tags, which are far
//! looser than semantic versions. A tag may be a plain release ("3.3",
//! "4.6.2"), a release with a stability suffix ("4.0.0-RC1"), a branch alias
//! ("3.3.x-dev"), a default branch ("dev-master"), or a feature branch
//! ("dev-fix-solr"). Ordering follows Composer's rules closely enough to rank
//! all of these consistently:
//!
//! 1. Default branches rank above everything else.
//! 2. Numeric tags are ordered by their components, then by stability.
//! 3. Any other tag ranks below every numeric tag.

use regex::Regex;
use semver::{Prerelease, Version};
use std::cmp::Ordering;

/// Slot value of a wildcard component like the "x" in "3.3.x-dev".
const WILDCARD: u64 = 9_999_999;

/// Parser for Composer style version tags.
///
/// Holds its compiled patterns, so construct it once and pass it around.
#[derive(Debug, Clone)]
pub struct VersionParser {
    numeric: Regex,
    alias_prefix: Regex,
    default_branch: Regex,
}

impl VersionParser {
    /// Construct new version parser.
    pub fn new() -> Self {
        // INVARIANT: Patterns are static and known to compile.
        let numeric = Regex::new(
            r"(?i)^v?(?P<nums>\d+(?:\.(?:\d+|x|\*)){0,3})(?:[.-]?(?P<stab>dev|alpha|a|beta|b|rc|patch|pl|p)(?:[.-]?(?P<num>\d+))?)?$",
        );
        let alias_prefix = Regex::new(r"(?i)^(?P<version>(?:\d+\.)*\d+)(?:\.x)?-dev$");
        let default_branch = Regex::new(r"(?i)^(?:dev-)?(?:master|trunk|default)$");

        match (numeric, alias_prefix, default_branch) {
            (Ok(numeric), Ok(alias_prefix), Ok(default_branch)) => Self {
                numeric,
                alias_prefix,
                default_branch,
            },
            _ => unreachable!("version patterns are valid"),
        }
    }

    /// Extract numeric prefix of branch alias.
    ///
    /// Returns the dotted number run with a trailing dot, e.g., "3.3.x-dev"
    /// gives "3.3.". Returns `None` if alias is not a numeric branch alias.
    pub fn numeric_alias_prefix(&self, alias: &str) -> Option<String> {
        self.alias_prefix
            .captures(alias)
            .and_then(|caps| caps.name("version"))
            .map(|version| format!("{}.", version.as_str()))
    }

    /// Parse version tag into a comparable rank.
    pub fn rank(&self, tag: &str) -> TagRank {
        let trimmed = tag.trim();
        if self.default_branch.is_match(trimmed) {
            return TagRank::DefaultBranch;
        }

        match self.numeric_parts(trimmed) {
            Some(numeric) => TagRank::Numeric(numeric),
            None => TagRank::Branch(trimmed.to_string()),
        }
    }

    /// Sort version tags from highest to lowest.
    ///
    /// Tags of equal rank keep their relative input order.
    pub fn sort_descending(&self, tags: Vec<String>) -> Vec<String> {
        let mut ranked = tags
            .into_iter()
            .map(|tag| (self.rank(&tag), tag))
            .collect::<Vec<_>>();
        ranked.sort_by(|(lhs, _), (rhs, _)| rhs.cmp(lhs));
        ranked.into_iter().map(|(_, tag)| tag).collect()
    }

    /// Parse version string leniently into a semantic version.
    ///
    /// Accepts an optional "v" prefix and one to four dotted numeric
    /// components. Missing components are zero, and a fourth component is
    /// dropped. Anything after the first "-" becomes the pre-release part.
    /// Returns `None` for branches and anything else that is not a release.
    pub fn parse_lenient(&self, version: &str) -> Option<Version> {
        let version = version.trim();
        let version = version
            .strip_prefix('v')
            .or_else(|| version.strip_prefix('V'))
            .unwrap_or(version);
        let (core, pre) = match version.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (version, None),
        };

        let parts = core
            .split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;
        if parts.is_empty() || parts.len() > 4 {
            return None;
        }

        let mut semver = Version::new(
            parts[0],
            parts.get(1).copied().unwrap_or(0),
            parts.get(2).copied().unwrap_or(0),
        );
        if let Some(pre) = pre {
            semver.pre = Prerelease::new(pre).ok()?;
        }

        Some(semver)
    }

    fn numeric_parts(&self, tag: &str) -> Option<NumericTag> {
        let caps = self.numeric.captures(tag)?;
        let nums = caps.name("nums")?.as_str();

        let mut parts = [0; 4];
        let mut wildcard = false;
        for (slot, part) in nums.split('.').enumerate() {
            wildcard |= matches!(part, "x" | "X" | "*");
            parts[slot] = if wildcard { WILDCARD } else { part.parse().ok()? };
        }
        if wildcard {
            for slot in parts.iter_mut().skip(nums.split('.').count()) {
                *slot = WILDCARD;
            }
        }

        let stability = caps
            .name("stab")
            .map(|stab| Stability::from_suffix(stab.as_str()))
            .unwrap_or(Stability::Stable);
        let stability_number = caps
            .name("num")
            .and_then(|num| num.as_str().parse().ok())
            .unwrap_or(0);

        Some(NumericTag {
            parts,
            stability,
            stability_number,
        })
    }
}

impl Default for VersionParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Comparable rank of a version tag.
///
/// Variant order is rank order, lowest first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TagRank {
    /// Anything that is not a release, e.g., "dev-fix-solr".
    Branch(String),

    /// Release tag, possibly with stability suffix.
    Numeric(NumericTag),

    /// Default branch, e.g., "dev-master".
    DefaultBranch,
}

/// Numeric release tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericTag {
    parts: [u64; 4],
    stability: Stability,
    stability_number: u64,
}

impl Ord for NumericTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts
            .cmp(&other.parts)
            .then(self.stability.cmp(&other.stability))
            .then(self.stability_number.cmp(&other.stability_number))
    }
}

impl PartialOrd for NumericTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Release stability, least stable first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stability {
    Dev,
    Alpha,
    Beta,
    ReleaseCandidate,
    Stable,
    Patch,
}

impl Stability {
    fn from_suffix(suffix: &str) -> Self {
        match suffix.to_ascii_lowercase().as_str() {
            "dev" => Self::Dev,
            "alpha" | "a" => Self::Alpha,
            "beta" | "b" => Self::Beta,
            "rc" => Self::ReleaseCandidate,
            "patch" | "pl" | "p" => Self::Patch,
            _ => Self::Stable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    fn sorted(tags: &[&str]) -> Vec<String> {
        VersionParser::new().sort_descending(tags.iter().map(ToString::to_string).collect())
    }

    #[test_case("3.3.x-dev", Some("3.3."); "branch alias with wildcard")]
    #[test_case("4-dev", Some("4."); "single component")]
    #[test_case("4.6.2.X-DEV", Some("4.6.2."); "case insensitive")]
    #[test_case("dev-", None; "no numeric prefix")]
    #[test_case("dev-master", None; "default branch")]
    #[test_case("3.3", None; "release is not an alias")]
    #[test]
    fn numeric_alias_prefix(alias: &str, expect: Option<&str>) {
        use pretty_assertions::assert_eq;
        let result = VersionParser::new().numeric_alias_prefix(alias);
        assert_eq!(result.as_deref(), expect);
    }

    #[test]
    fn sort_numeric_tags_descending() {
        assert_eq!(sorted(&["3.2", "4.0", "3.3"]), vec!["4.0", "3.3", "3.2"]);
        assert_eq!(sorted(&["3.3", "3.3.1"]), vec!["3.3.1", "3.3"]);
        assert_eq!(sorted(&["3.10", "3.9", "v3.11"]), vec!["v3.11", "3.10", "3.9"]);
    }

    #[test]
    fn sort_stability_below_release() {
        assert_eq!(
            sorted(&["4.0.0-beta1", "4.0.0", "4.0.0-RC2", "4.0.0-RC1", "3.3"]),
            vec!["4.0.0", "4.0.0-RC2", "4.0.0-RC1", "4.0.0-beta1", "3.3"]
        );
    }

    #[test]
    fn sort_branches_around_releases() {
        assert_eq!(
            sorted(&["3.3", "dev-fix-solr", "dev-master", "4.0", "3.3.x-dev"]),
            vec!["dev-master", "4.0", "3.3.x-dev", "3.3", "dev-fix-solr"]
        );
    }

    #[test]
    fn sort_keeps_input_order_for_equal_rank() {
        assert_eq!(sorted(&["3.3", "3.3.0"]), vec!["3.3", "3.3.0"]);
        assert_eq!(sorted(&["3.3.0", "3.3"]), vec!["3.3.0", "3.3"]);
    }

    #[test_case("3.3.5", Some(Version::new(3, 3, 5)); "plain")]
    #[test_case("v4.6", Some(Version::new(4, 6, 0)); "prefix and padding")]
    #[test_case("4.6.2.0", Some(Version::new(4, 6, 2)); "composer normalized")]
    #[test_case("dev-master", None; "branch")]
    #[test_case("4.6.x-dev", None; "branch alias")]
    #[test]
    fn parse_lenient(version: &str, expect: Option<Version>) {
        use pretty_assertions::assert_eq;
        assert_eq!(VersionParser::new().parse_lenient(version), expect);
    }

    #[test]
    fn parse_lenient_keeps_prerelease() {
        let result = VersionParser::new().parse_lenient("4.0.0.0-RC1").unwrap();
        assert_eq!(result.pre.as_str(), "RC1");
    }
}
