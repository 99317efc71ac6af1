// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Layered installation of resource sets.
//!
//! Installation copies two resource sets onto one destination directory in a
//! fixed order: the common set first, then the product specific set. The
//! specific set is an override layer. Whenever both sets carry a file at the
//! same relative path, the specific copy is written last and wins.
//!
//! # Collisions
//!
//! A __collision__ is a copy whose destination already existed. Collisions
//! are reported at verbose level so the user knows which of their own files
//! were replaced. Overrides of common files by specific files are expected,
//! so they are never reported, even though the destination certainly exists
//! by the time the specific set is copied.
//!
//! # Partial Installs
//!
//! There is no rollback. If a copy fails, every file copied before it stays
//! in place, and the failing relative path is reported.

use crate::{
    fs::{Filesystem, FsError, LocalFilesystem},
    resource::{ResourceFile, ResourceSet},
};

use indicatif::ProgressBar;
use std::{
    collections::HashSet,
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Install resource sets in layers onto a destination directory.
#[derive(Debug, Default, Clone)]
pub struct LayeredInstaller<F = LocalFilesystem>
where
    F: Filesystem,
{
    fs: F,
}

impl<F> LayeredInstaller<F>
where
    F: Filesystem,
{
    /// Construct new layered installer over filesystem.
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Copy common set, then specific set, onto destination.
    ///
    /// Progress of both passes is shown through `bar`. Pass a hidden bar to
    /// install quietly.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::CopyFailure`] if any file cannot be copied.
    ///   Files copied before the failure are left in place.
    #[instrument(skip_all, fields(destination = %destination.display()), level = "debug")]
    pub fn install(
        &self,
        common: &ResourceSet,
        specific: &ResourceSet,
        destination: &Path,
        bar: &ProgressBar,
    ) -> Result<InstallReport> {
        let mut report = InstallReport::default();
        let common_paths = common.relative_paths();

        info!("Copying common files");
        bar.set_length(common.len() as u64);
        bar.set_position(0);
        bar.set_message(InstallPhase::Common.to_string());
        for file in common {
            let record = self.copy(InstallPhase::Common, file, destination, true, bar)?;
            report.push(record);
            bar.inc(1);
        }

        info!("Copying product specific files");
        bar.set_length(specific.len() as u64);
        bar.set_position(0);
        bar.set_message(InstallPhase::Specific.to_string());
        for file in specific {
            // INVARIANT: Overriding a common file is expected, so never report it.
            let report_collision = !common_paths.contains(file.relative_path.as_path());
            let record = self.copy(InstallPhase::Specific, file, destination, report_collision, bar)?;
            report.push(record);
            bar.inc(1);
        }
        bar.finish_and_clear();

        info!(
            "copied {} common and {} product specific files",
            report.common_copied, report.specific_copied
        );

        Ok(report)
    }

    fn copy(
        &self,
        phase: InstallPhase,
        file: &ResourceFile,
        destination: &Path,
        report_collision: bool,
        bar: &ProgressBar,
    ) -> Result<CollisionRecord> {
        let target = destination.join(&file.relative_path);
        let was_overwritten = report_collision && self.fs.exists(&target);
        if was_overwritten {
            bar.suspend(|| {
                debug!(
                    "file {:?} exists and has been overwritten",
                    file.relative_path.display()
                )
            });
        }

        self.fs
            .copy(&file.source_path, &target, true)
            .map_err(|err| InstallError::CopyFailure {
                source: err,
                phase,
                relative_path: file.relative_path.clone(),
            })?;

        Ok(CollisionRecord {
            phase,
            relative_path: file.relative_path.clone(),
            was_overwritten,
        })
    }
}

/// Pass of layered installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallPhase {
    /// Copying files shared by every product edition.
    Common,

    /// Copying files of the installed product edition.
    Specific,
}

impl Display for InstallPhase {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Common => fmt.write_str("common files"),
            Self::Specific => fmt.write_str("product specific files"),
        }
    }
}

/// Outcome of one copy operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionRecord {
    /// Pass the copy happened in.
    pub phase: InstallPhase,

    /// Path of copied file relative to destination.
    pub relative_path: PathBuf,

    /// Copy replaced a pre-existing file that was not expected to be there.
    pub was_overwritten: bool,
}

/// Summary of layered installation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstallReport {
    records: Vec<CollisionRecord>,
    common_copied: usize,
    specific_copied: usize,
}

impl InstallReport {
    fn push(&mut self, record: CollisionRecord) {
        match record.phase {
            InstallPhase::Common => self.common_copied += 1,
            InstallPhase::Specific => self.specific_copied += 1,
        }
        self.records.push(record);
    }

    /// Every copy operation in the order it happened.
    pub fn records(&self) -> &[CollisionRecord] {
        &self.records
    }

    /// Copy operations that replaced an unexpected pre-existing file.
    pub fn collisions(&self) -> impl Iterator<Item = &CollisionRecord> {
        self.records.iter().filter(|record| record.was_overwritten)
    }

    /// Number of common files copied.
    pub fn common_copied(&self) -> usize {
        self.common_copied
    }

    /// Number of product specific files copied.
    pub fn specific_copied(&self) -> usize {
        self.specific_copied
    }

    /// Distinct destination paths written to.
    pub fn written_paths(&self) -> HashSet<&Path> {
        self.records
            .iter()
            .map(|record| record.relative_path.as_path())
            .collect()
    }
}

/// Layered installation error types.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// File could not be copied into destination.
    #[error("failed to install {} file {:?}", phase, relative_path.display())]
    CopyFailure {
        #[source]
        source: FsError,
        phase: InstallPhase,
        relative_path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = InstallError> = std::result::Result<T, E>;
