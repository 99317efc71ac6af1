// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Filesystem access.
//!
//! Every piece of logic that needs to touch the disk goes through the
//! [`Filesystem`] trait. Version resolution only needs to list directories,
//! resource scanning only needs to list files, and layered installation only
//! needs to check for and copy files. Keeping these behind one seam lets the
//! resolver and installer stay free of direct I/O.
//!
//! Directory walking is performed with the [`ignore`] crate with all of its
//! standard filters turned off. Hidden files are visited, symbolic links are
//! followed, and no ignore file of any kind is consulted.

use ignore::{DirEntry, WalkBuilder};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::trace;

/// Filesystem capability used by resolution and installation.
pub trait Filesystem {
    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Copy file from `src` to `dst`, creating missing parent directories.
    ///
    /// Returns `true` if a copy was made. If `overwrite` is false and `dst`
    /// already exists, then nothing is copied.
    fn copy(&self, src: &Path, dst: &Path, overwrite: bool) -> Result<bool>;

    /// List names of directories exactly `depth` levels below `path`.
    ///
    /// A depth of one lists immediate subdirectories. Names are relative to
    /// `path` and are sorted.
    fn list_directories(&self, path: &Path, depth: usize) -> Result<Vec<String>>;

    /// List all regular files below `path`, relative to `path`.
    ///
    /// Dotfiles are included, and symbolic links are followed. Ordering is
    /// by file name at each level, thus stable between calls.
    fn list_files_recursive(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

impl<F> Filesystem for &F
where
    F: Filesystem + ?Sized,
{
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn copy(&self, src: &Path, dst: &Path, overwrite: bool) -> Result<bool> {
        (**self).copy(src, dst, overwrite)
    }

    fn list_directories(&self, path: &Path, depth: usize) -> Result<Vec<String>> {
        (**self).list_directories(path, depth)
    }

    fn list_files_recursive(&self, path: &Path) -> Result<Vec<PathBuf>> {
        (**self).list_files_recursive(path)
    }
}

/// Filesystem access through the local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Construct new local filesystem accessor.
    pub fn new() -> Self {
        Self
    }

    fn walker(&self, path: &Path) -> Result<WalkBuilder> {
        if !path.is_dir() {
            return Err(FsError::MissingDirectory {
                path: path.to_path_buf(),
            });
        }

        let mut builder = WalkBuilder::new(path);
        builder
            .standard_filters(false)
            .follow_links(true)
            .sort_by_file_name(|lhs, rhs| lhs.cmp(rhs));

        Ok(builder)
    }
}

impl Filesystem for LocalFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn copy(&self, src: &Path, dst: &Path, overwrite: bool) -> Result<bool> {
        if !overwrite && dst.exists() {
            trace!("skip copy of {:?}, destination exists", dst.display());
            return Ok(false);
        }

        if let Some(parent) = dst.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            mkdirp::mkdirp(parent).map_err(|err| FsError::CreateDirectory {
                source: err,
                path: parent.to_path_buf(),
            })?;
        }

        fs::copy(src, dst).map_err(|err| FsError::Copy {
            source: err,
            from: src.to_path_buf(),
            to: dst.to_path_buf(),
        })?;
        trace!("copied {:?} to {:?}", src.display(), dst.display());

        Ok(true)
    }

    fn list_directories(&self, path: &Path, depth: usize) -> Result<Vec<String>> {
        let mut builder = self.walker(path)?;
        builder.max_depth(Some(depth));

        let mut names = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            if entry.depth() != depth || !is_dir(&entry) {
                continue;
            }

            let relative = relative_to(path, entry.path());
            names.push(relative.to_string_lossy().into_owned());
        }
        names.sort();

        Ok(names)
    }

    fn list_files_recursive(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let builder = self.walker(path)?;

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            if entry.file_type().is_some_and(|kind| kind.is_file()) {
                files.push(relative_to(path, entry.path()));
            }
        }

        Ok(files)
    }
}

fn is_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|kind| kind.is_dir())
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Filesystem error types.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// Directory to walk does not exist.
    #[error("directory {:?} does not exist", path.display())]
    MissingDirectory { path: PathBuf },

    /// Parent directory of copy destination cannot be created.
    #[error("failed to create directory {:?}", path.display())]
    CreateDirectory {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File cannot be copied.
    #[error("failed to copy {:?} to {:?}", from.display(), to.display())]
    Copy {
        #[source]
        source: std::io::Error,
        from: PathBuf,
        to: PathBuf,
    },

    /// Directory walk failed part way through.
    #[error(transparent)]
    Walk(#[from] ignore::Error),
}

/// Friendly result alias :3
pub type Result<T, E = FsError> = std::result::Result<T, E>;
