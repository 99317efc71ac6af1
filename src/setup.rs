// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Platform.sh configuration setup.
//!
//! Ties every piece together for one setup run:
//!
//! 1. Identify installed product edition through the package registry.
//! 2. Resolve version directory in the common and product specific resource
//!    areas.
//! 3. Scan both version directories into resource sets.
//! 4. Install both sets in layers into the project.
//!
//! Nothing is copied unless steps one through three succeed. Each run starts
//! from scratch, so no state is carried between runs.

use crate::{
    fs::{Filesystem, LocalFilesystem},
    install::{InstallError, InstallReport, LayeredInstaller},
    product::{PackageRegistry, ProductError, ProductIdentity},
    resource::{ResourceError, ResourceLayout, ResourceSet},
    version::{VersionError, VersionResolver},
};

use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Resolved version directories of an installed product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupPlan {
    /// Installed product edition.
    pub product: ProductIdentity,

    /// Version directory of common resources.
    pub common_dir: PathBuf,

    /// Version directory of product specific resources.
    pub specific_dir: PathBuf,
}

/// Platform.sh configuration setup over a resource root.
#[derive(Debug, Clone)]
pub struct Setup<F = LocalFilesystem>
where
    F: Filesystem,
{
    fs: F,
    layout: ResourceLayout,
    resolver: VersionResolver,
}

impl<F> Setup<F>
where
    F: Filesystem,
{
    /// Construct new setup over resource layout.
    pub fn new(fs: F, layout: ResourceLayout) -> Self {
        Self {
            fs,
            layout,
            resolver: VersionResolver::default(),
        }
    }

    /// Replace version resolver.
    pub fn with_resolver(mut self, resolver: VersionResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Resource layout in use.
    pub fn layout(&self) -> &ResourceLayout {
        &self.layout
    }

    /// Resolve common and product specific version directories of product.
    ///
    /// # Errors
    ///
    /// - Return [`SetupError::Version`] if either area has no matching
    ///   version directory, or cannot be listed.
    #[instrument(skip(self, product), fields(product = product.name()), level = "debug")]
    pub fn plan(&self, product: &ProductIdentity) -> Result<SetupPlan> {
        let common_area = self.layout.common_area();
        let common_version = self.resolver.resolve(&self.fs, product, &common_area)?;

        let product_area = self.layout.product_area(product);
        let specific_version = self.resolver.resolve(&self.fs, product, &product_area)?;

        Ok(SetupPlan {
            product: product.clone(),
            common_dir: common_area.join(common_version),
            specific_dir: product_area.join(specific_version),
        })
    }

    /// Install Platform.sh configuration files into project.
    ///
    /// # Errors
    ///
    /// - Return [`SetupError::Product`] if no product edition is installed.
    /// - Return [`SetupError::Version`] if version directories cannot be
    ///   resolved.
    /// - Return [`SetupError::Resource`] if version directories cannot be
    ///   scanned.
    /// - Return [`SetupError::Install`] if a file cannot be copied.
    #[instrument(skip_all, fields(project = %project_dir.display()), level = "debug")]
    pub fn platform_sh(
        &self,
        registry: &impl PackageRegistry,
        project_dir: &Path,
        bar: &ProgressBar,
    ) -> Result<InstallReport> {
        info!("Installing Platform.sh config files");
        let product = ProductIdentity::resolve(registry)?;
        info!(
            "detected {} at version {}",
            product.name(),
            product.installed_version()
        );

        let plan = self.plan(&product)?;
        let report = install_layered(
            &self.fs,
            &plan.common_dir,
            &plan.specific_dir,
            project_dir,
            bar,
        )?;
        info!("Platform.sh config files installed successfully");

        Ok(report)
    }
}

/// Scan common and specific roots, then install both onto destination.
///
/// Both roots are scanned before anything is copied.
///
/// # Errors
///
/// - Return [`SetupError::Resource`] if either root cannot be scanned.
/// - Return [`SetupError::Install`] if a file cannot be copied.
pub fn install_layered(
    fs: &impl Filesystem,
    common_root: &Path,
    specific_root: &Path,
    destination: &Path,
    bar: &ProgressBar,
) -> Result<InstallReport> {
    let common = ResourceSet::scan(fs, common_root)?;
    let specific = ResourceSet::scan(fs, specific_root)?;

    Ok(LayeredInstaller::new(fs).install(&common, &specific, destination, bar)?)
}

/// Setup error types.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// Installed product cannot be identified.
    #[error(transparent)]
    Product(#[from] ProductError),

    /// Version directory cannot be resolved.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Resource directory cannot be scanned.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Resources cannot be installed.
    #[error(transparent)]
    Install(#[from] InstallError),
}

/// Friendly result alias :3
pub type Result<T, E = SetupError> = std::result::Result<T, E>;
