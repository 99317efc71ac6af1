// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Post-install setup of Ibexa projects.
//!
//! Installs the Platform.sh configuration files matching the installed Ibexa
//! product edition and its version into a project. Resources come in two
//! layers: files common to every edition, and files specific to one edition.
//! Both layers keep one directory per supported release line, and the
//! directory matching the installed version is picked for each layer before
//! the layers are copied into the project.
//!
//! # See Also
//!
//! 1. [`product`] for installed edition detection.
//! 2. [`version`] for version directory resolution.
//! 3. [`install`] for layered installation and collision reporting.

pub mod config;
pub mod fs;
pub mod install;
pub mod path;
pub mod product;
pub mod resource;
pub mod setup;
pub mod version;

pub use crate::{
    fs::{Filesystem, LocalFilesystem},
    install::{CollisionRecord, InstallPhase, InstallReport, LayeredInstaller},
    product::{InstalledJson, PackageRegistry, ProductIdentity},
    resource::{ResourceFile, ResourceLayout, ResourceSet},
    setup::{install_layered, Setup, SetupPlan},
    version::{resolve_version_directory, VersionResolver},
};
