// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Version directory resolution.
//!
//! Resource areas keep one subdirectory per supported release line of the
//! installed product. The name of each subdirectory is a version tag, e.g.,
//! "3.3", "4.6", "dev-master". Resolution picks the one subdirectory that
//! best matches the installed product version.
//!
//! # Matching Rules
//!
//! Candidate directories are walked from highest to lowest version tag, and
//! the first candidate that satisfies _any_ of the following is picked:
//!
//! 1. Candidate equals the installed version exactly.
//! 2. Candidate equals a normalized release alias ("3.3.x-dev" gives "3.3").
//! 3. Candidate equals a raw release alias.
//! 4. Candidate does not start with "dev-", and the installed version is
//!    compatible with the candidate through the tilde constraint
//!    `~candidate`.
//!
//! There is no priority between the kinds of match. The position of the
//! candidate in the descending order alone decides which directory wins.
//!
//! # Tilde Constraint
//!
//! Tilde compatibility is decided by the [`semver`] crate. Thus, `~3.3`
//! allows `>=3.3.0, <3.4.0`, `~3` allows `>=3.0.0, <4.0.0`, and `~3.3.1`
//! allows `>=3.3.1, <3.4.0`. A pre-release of the installed version only
//! satisfies a constraint whose anchor names the same release.

pub mod ordering;

use crate::{
    fs::{Filesystem, FsError},
    product::ProductIdentity,
    version::ordering::VersionParser,
};

use semver::VersionReq;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace};

/// Prefix of branch tags that never match through the tilde constraint.
const BRANCH_PREFIX: &str = "dev-";

/// Resolve version directories for an installed product.
#[derive(Debug, Clone, Default)]
pub struct VersionResolver {
    parser: VersionParser,
}

impl VersionResolver {
    /// Construct new version resolver around a version parser.
    pub fn new(parser: VersionParser) -> Self {
        Self { parser }
    }

    /// Resolve version directory of product under resource area at `path`.
    ///
    /// # Errors
    ///
    /// - Return [`VersionError::Filesystem`] if `path` cannot be listed.
    /// - Return [`VersionError::InvalidAliasFormat`] if an alias of the
    ///   product is not a numeric branch alias.
    /// - Return [`VersionError::NoMatchingVersionDirectory`] if no candidate
    ///   directory matches.
    #[instrument(skip(self, fs, product), fields(product = product.name()), level = "debug")]
    pub fn resolve(
        &self,
        fs: &impl Filesystem,
        product: &ProductIdentity,
        path: &Path,
    ) -> Result<String> {
        let candidates = fs.list_directories(path, 1)?;
        debug!("candidate version directories: {candidates:?}");

        self.select(candidates, product.installed_version(), product.aliases())?
            .ok_or_else(|| VersionError::NoMatchingVersionDirectory {
                product: product.name().into(),
                version: product.installed_version().into(),
                path: path.to_path_buf(),
            })
    }

    /// Select best matching candidate for product version and aliases.
    ///
    /// Returns `None` if no candidate matches.
    ///
    /// # Errors
    ///
    /// - Return [`VersionError::InvalidAliasFormat`] if an alias is not a
    ///   numeric branch alias.
    pub fn select(
        &self,
        candidates: Vec<String>,
        version: &str,
        aliases: &[String],
    ) -> Result<Option<String>> {
        let normalized = self.normalize_aliases(aliases)?;

        for candidate in self.parser.sort_descending(candidates) {
            if candidate == version {
                trace!("{candidate:?} matches version exactly");
                return Ok(Some(candidate));
            }

            if normalized.contains(&candidate) {
                trace!("{candidate:?} matches normalized alias");
                return Ok(Some(candidate));
            }

            if aliases.contains(&candidate) {
                trace!("{candidate:?} matches raw alias");
                return Ok(Some(candidate));
            }

            if !candidate.starts_with(BRANCH_PREFIX) && self.satisfies_tilde(version, &candidate) {
                trace!("{version:?} satisfies ~{candidate}");
                return Ok(Some(candidate));
            }
        }

        Ok(None)
    }

    /// Normalize release aliases to their numeric prefix.
    ///
    /// # Errors
    ///
    /// - Return [`VersionError::InvalidAliasFormat`] if an alias is not a
    ///   numeric branch alias.
    pub fn normalize_aliases(&self, aliases: &[String]) -> Result<Vec<String>> {
        aliases
            .iter()
            .map(|alias| self.normalize_alias(alias))
            .collect()
    }

    /// Normalize release alias to its numeric prefix, e.g., "3.3.x-dev" gives
    /// "3.3".
    ///
    /// # Errors
    ///
    /// - Return [`VersionError::InvalidAliasFormat`] if alias is not a numeric
    ///   branch alias.
    pub fn normalize_alias(&self, alias: &str) -> Result<String> {
        self.parser
            .numeric_alias_prefix(alias)
            .map(|prefix| prefix.trim_matches('.').to_string())
            .ok_or_else(|| VersionError::InvalidAliasFormat {
                alias: alias.into(),
            })
    }

    /// Check if version is compatible with `~anchor`.
    ///
    /// Versions or anchors that cannot be read as releases never match.
    pub fn satisfies_tilde(&self, version: &str, anchor: &str) -> bool {
        let Some(version) = self.parser.parse_lenient(version) else {
            return false;
        };

        let anchor = anchor.strip_prefix('v').unwrap_or(anchor);
        match VersionReq::parse(&format!("~{anchor}")) {
            Ok(requirement) => requirement.matches(&version),
            Err(error) => {
                trace!("cannot read ~{anchor} as constraint: {error}");
                false
            }
        }
    }
}

/// Resolve version directory of product under `root` through local disk.
///
/// # Errors
///
/// - Return [`VersionError`] if resolution fails for any reason.
pub fn resolve_version_directory(
    fs: &impl Filesystem,
    product: &ProductIdentity,
    root: impl AsRef<Path>,
) -> Result<String> {
    VersionResolver::default().resolve(fs, product, root.as_ref())
}

/// Version directory resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    /// Release alias has no numeric prefix to normalize.
    #[error("release alias {alias:?} is not a numeric branch alias like \"3.3.x-dev\"")]
    InvalidAliasFormat { alias: String },

    /// No candidate directory matches product version.
    #[error(
        "cannot find directory matching {product} version {version:?} in {:?}",
        path.display()
    )]
    NoMatchingVersionDirectory {
        product: String,
        version: String,
        path: PathBuf,
    },

    /// Candidate directories cannot be listed.
    #[error(transparent)]
    Filesystem(#[from] FsError),
}

/// Friendly result alias :3
pub type Result<T, E = VersionError> = std::result::Result<T, E>;
