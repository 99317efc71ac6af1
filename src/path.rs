// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for external files that need to be
//! read from, or written into, during setup.

use std::path::{Path, PathBuf};

/// Determine default absolute path to configuration file.
///
/// Uses XDG Base Directory path `$XDG_CONFIG_HOME/ibexa-postinstall/config.toml`
/// as the default. Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if configuration directory cannot be determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_config_file() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join("ibexa-postinstall").join("config.toml"))
        .ok_or(NoWayHome)
}

/// Determine default resource root of a project.
///
/// Resources ship inside the post-install package itself, which Composer
/// places at `vendor/ibexa/post-install`.
pub fn default_resource_root(project_dir: impl AsRef<Path>) -> PathBuf {
    project_dir
        .as_ref()
        .join("vendor")
        .join("ibexa")
        .join("post-install")
        .join("resources")
        .join("platformsh")
}

/// Determine path to Composer's installed package listing of a project.
pub fn installed_packages_file(project_dir: impl AsRef<Path>) -> PathBuf {
    project_dir
        .as_ref()
        .join("vendor")
        .join("composer")
        .join("installed.json")
}

/// No way to determine user's configuration directory.
///
/// # See Also
///
/// - [`dirs::config_dir`](https://docs.rs/dirs/latest/dirs/fn.config_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's configuration directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn project_relative_paths() {
        assert_eq!(
            default_resource_root("/srv/site"),
            PathBuf::from("/srv/site/vendor/ibexa/post-install/resources/platformsh")
        );
        assert_eq!(
            installed_packages_file("/srv/site"),
            PathBuf::from("/srv/site/vendor/composer/installed.json")
        );
    }
}
