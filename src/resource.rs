// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Resource sets and their layout on disk.
//!
//! # Resource Root Layout
//!
//! All installable resources live under one __resource root__. The root is
//! split into resource areas: one "common" area shared by every product
//! edition, and one area per product edition named after the product package
//! with its vendor separator replaced by a dash. Each area holds one
//! directory per supported release line:
//!
//! ```text
//! <resource-root>/common/<version-dir>/...
//! <resource-root>/<product-dir>/<version-dir>/...
//! ```
//!
//! # Resource Sets
//!
//! A __resource set__ is every regular file found below a resolved version
//! directory, each paired with its path relative to that directory. The
//! relative path is where the file lands inside the destination project.

use crate::{
    fs::{Filesystem, FsError},
    product::ProductIdentity,
};

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Name of resource area shared by all product editions.
pub const COMMON_AREA: &str = "common";

/// Layout of resource root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLayout {
    root: PathBuf,
}

impl ResourceLayout {
    /// Construct new resource layout at target root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path to resource root.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Path to common resource area.
    pub fn common_area(&self) -> PathBuf {
        self.root.join(COMMON_AREA)
    }

    /// Path to product specific resource area.
    pub fn product_area(&self, product: &ProductIdentity) -> PathBuf {
        self.root.join(product.directory_name())
    }
}

/// File of a resource set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFile {
    /// Absolute path to file in resource root.
    pub source_path: PathBuf,

    /// Path relative to version directory, and thus to destination.
    pub relative_path: PathBuf,
}

/// Ordered listing of resource files.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResourceSet {
    root: PathBuf,
    files: Vec<ResourceFile>,
}

impl ResourceSet {
    /// Scan all files below `root` into a resource set.
    ///
    /// Dotfiles are included, and symbolic links are followed.
    ///
    /// # Errors
    ///
    /// - Return [`ResourceError::ResourceRootMissing`] if `root` does not
    ///   exist.
    /// - Return [`ResourceError::Scan`] if walking `root` fails part way.
    #[instrument(skip(fs), level = "debug")]
    pub fn scan(fs: &impl Filesystem, root: impl AsRef<Path> + std::fmt::Debug) -> Result<Self> {
        let root = root.as_ref();
        let files = fs
            .list_files_recursive(root)
            .map_err(|err| match err {
                FsError::MissingDirectory { path } => ResourceError::ResourceRootMissing { path },
                err => ResourceError::Scan(err),
            })?
            .into_iter()
            .map(|relative_path| ResourceFile {
                source_path: root.join(&relative_path),
                relative_path,
            })
            .collect::<Vec<_>>();
        debug!("found {} resource files in {:?}", files.len(), root.display());

        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    /// Construct resource set from files that were already listed.
    pub fn from_files(
        root: impl Into<PathBuf>,
        files: impl IntoIterator<Item = ResourceFile>,
    ) -> Self {
        Self {
            root: root.into(),
            files: files.into_iter().collect(),
        }
    }

    /// Directory the set was scanned from.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Files of the set in scan order.
    pub fn files(&self) -> &[ResourceFile] {
        &self.files
    }

    /// Number of files in the set.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if set has no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Collect relative paths of every file in the set.
    pub fn relative_paths(&self) -> HashSet<&Path> {
        self.files
            .iter()
            .map(|file| file.relative_path.as_path())
            .collect()
    }
}

impl<'set> IntoIterator for &'set ResourceSet {
    type Item = &'set ResourceFile;
    type IntoIter = std::slice::Iter<'set, ResourceFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Resource scanning error types.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// Directory to scan does not exist.
    #[error("resource directory {:?} does not exist", path.display())]
    ResourceRootMissing { path: PathBuf },

    /// Directory walk failed.
    #[error(transparent)]
    Scan(FsError),
}

/// Friendly result alias :3
pub type Result<T, E = ResourceError> = std::result::Result<T, E>;
