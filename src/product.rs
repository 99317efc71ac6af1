// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Installed product identification.
//!
//! An Ibexa project always pulls in exactly one __product edition__ package
//! through Composer, but editions build on top of each other. Installing
//! `ibexa/commerce` drags `ibexa/experience`, `ibexa/content`, and `ibexa/oss`
//! along with it. Thus, the edition of a project is the _richest_ edition
//! package that is installed, which is why [`KNOWN_PRODUCTS`] is ordered.
//!
//! # Installed Package Registry
//!
//! Composer records every package it installs in
//! `vendor/composer/installed.json`. The [`InstalledJson`] registry reads that
//! file to answer which packages are installed, and what version and release
//! aliases a given package was installed with.

use serde::Deserialize;
use std::{
    collections::HashMap,
    fs::read_to_string,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Known product edition packages.
///
/// Order matters. The first entry that is installed wins.
pub const KNOWN_PRODUCTS: [&str; 4] = [
    "ibexa/commerce",
    "ibexa/experience",
    "ibexa/content",
    "ibexa/oss",
];

/// Installed product edition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductIdentity {
    name: String,
    installed_version: String,
    aliases: Vec<String>,
}

impl ProductIdentity {
    /// Construct new product identity.
    pub fn new(
        name: impl Into<String>,
        installed_version: impl Into<String>,
        aliases: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            installed_version: installed_version.into(),
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolve installed product edition through package registry.
    ///
    /// # Errors
    ///
    /// - Return [`ProductError::NoProductInstalled`] if no known product
    ///   edition is installed.
    /// - Return [`ProductError::UnknownPackage`] if registry cannot describe
    ///   the product it claims is installed.
    #[instrument(skip(registry), level = "debug")]
    pub fn resolve(registry: &impl PackageRegistry) -> Result<Self> {
        let installed = registry.installed_packages()?;
        let name = select_product(&installed).ok_or_else(|| ProductError::NoProductInstalled {
            known: KNOWN_PRODUCTS.join(", "),
        })?;
        let info = registry.package_info(name)?;
        debug!(
            "installed product {name} at version {} with aliases {:?}",
            info.version, info.aliases
        );

        Ok(Self::new(name, info.version, info.aliases))
    }

    /// Name of the product package, e.g., "ibexa/oss".
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version the product package was installed at.
    pub fn installed_version(&self) -> &str {
        &self.installed_version
    }

    /// Release aliases declared for the installed version.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Name of resource directory holding product specific files.
    ///
    /// Package vendor separator is replaced with a dash, so "ibexa/oss" maps
    /// to "ibexa-oss".
    pub fn directory_name(&self) -> String {
        self.name.replace('/', "-")
    }
}

/// Pick first known product edition that is installed.
///
/// Installation order is irrelevant, only the order of [`KNOWN_PRODUCTS`]
/// decides.
pub fn select_product(installed: &[String]) -> Option<&'static str> {
    KNOWN_PRODUCTS
        .iter()
        .copied()
        .find(|known| installed.iter().any(|package| package == known))
}

/// Version information of an installed package.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub version: String,
    pub aliases: Vec<String>,
}

/// Source of installed package information.
pub trait PackageRegistry {
    /// List names of all installed packages.
    fn installed_packages(&self) -> Result<Vec<String>>;

    /// Describe installed version and aliases of target package.
    fn package_info(&self, name: &str) -> Result<PackageInfo>;
}

/// Package registry backed by Composer's `installed.json` file.
#[derive(Debug, Clone)]
pub struct InstalledJson {
    path: PathBuf,
    packages: Vec<InstalledPackage>,
}

impl InstalledJson {
    /// Load registry from `installed.json` at target path.
    ///
    /// # Errors
    ///
    /// - Return [`ProductError::ReadRegistry`] if file cannot be read.
    /// - Return [`ProductError::ParseRegistry`] if file is not valid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = read_to_string(&path).map_err(|err| ProductError::ReadRegistry {
            source: err,
            path: path.clone(),
        })?;

        Self::parse(path, &data)
    }

    /// Parse registry from `installed.json` contents.
    ///
    /// Accepts the Composer 2 layout, i.e., an object with a "packages" list,
    /// and the Composer 1 layout, i.e., a bare list of packages.
    ///
    /// # Errors
    ///
    /// - Return [`ProductError::ParseRegistry`] if data is not valid.
    pub fn parse(path: impl Into<PathBuf>, data: &str) -> Result<Self> {
        let path = path.into();
        let layout: InstalledLayout =
            serde_json::from_str(data).map_err(|err| ProductError::ParseRegistry {
                source: err,
                path: path.clone(),
            })?;
        let packages = match layout {
            InstalledLayout::Composer2 { packages } => packages,
            InstalledLayout::Composer1(packages) => packages,
        };

        Ok(Self { path, packages })
    }
}

impl PackageRegistry for InstalledJson {
    fn installed_packages(&self) -> Result<Vec<String>> {
        Ok(self.packages.iter().map(|pkg| pkg.name.clone()).collect())
    }

    fn package_info(&self, name: &str) -> Result<PackageInfo> {
        let package = self
            .packages
            .iter()
            .find(|pkg| pkg.name == name)
            .ok_or_else(|| ProductError::UnknownPackage {
                name: name.into(),
                path: self.path.clone(),
            })?;

        // INVARIANT: Branch alias only applies to the branch that was installed.
        let aliases = package
            .extra
            .branch_alias
            .iter()
            .filter(|(branch, _)| **branch == package.version)
            .map(|(_, alias)| alias.clone())
            .collect();

        Ok(PackageInfo {
            version: package
                .version_normalized
                .clone()
                .unwrap_or_else(|| package.version.clone()),
            aliases,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstalledLayout {
    Composer2 { packages: Vec<InstalledPackage> },
    Composer1(Vec<InstalledPackage>),
}

#[derive(Debug, Clone, Deserialize)]
struct InstalledPackage {
    name: String,
    version: String,
    version_normalized: Option<String>,
    #[serde(default)]
    extra: PackageExtra,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct PackageExtra {
    #[serde(rename = "branch-alias", default)]
    branch_alias: HashMap<String, String>,
}

/// Product identification error types.
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    /// None of the known product editions are installed.
    #[error("no Ibexa product edition is installed, expected one of: {known}")]
    NoProductInstalled { known: String },

    /// Registry does not know about target package.
    #[error("package {name:?} is not listed in {:?}", path.display())]
    UnknownPackage { name: String, path: PathBuf },

    /// Registry file cannot be read.
    #[error("failed to read installed packages from {:?}", path.display())]
    ReadRegistry {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Registry file is malformed.
    #[error("failed to parse installed packages from {:?}", path.display())]
    ParseRegistry {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ProductError> = std::result::Result<T, E>;
