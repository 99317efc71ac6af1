// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout for the configuration file that the setup tool reads
//! to simplify the process of serialization and deserialization. File I/O is
//! left to the caller to figure out.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Setup configuration layout.
///
/// Every field is optional. Whatever is left out falls back to what the
/// command line says, and then to built-in defaults.
///
/// # General Layout
///
/// ```toml
/// [settings]
/// resource_root = "$HOME/ibexa/post-install/resources/platformsh"
/// project_dir = "$HOME/sites/shop"
/// ```
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct SetupConfig {
    /// Settings for setup.
    #[serde(default)]
    pub settings: SetupSettings,
}

impl FromStr for SetupConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: SetupConfig = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on every path field.
        config.settings.resource_root = config
            .settings
            .resource_root
            .map(ConfigPath::expand)
            .transpose()?;
        config.settings.project_dir = config
            .settings
            .project_dir
            .map(ConfigPath::expand)
            .transpose()?;

        Ok(config)
    }
}

impl Display for SetupConfig {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Setup settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct SetupSettings {
    /// Directory holding the common and product specific resource areas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_root: Option<ConfigPath>,

    /// Project to install resources into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_dir: Option<ConfigPath>,
}

/// Path given through configuration.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct ConfigPath(PathBuf);

impl ConfigPath {
    /// Construct new configuration path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Treat configuration path as [`Path`] slice.
    pub fn as_path(&self) -> &Path {
        self.0.as_path()
    }

    /// Convert configuration path into [`PathBuf`].
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    fn expand(self) -> Result<Self> {
        let expanded = shellexpand::full(self.to_string().as_str())
            .map_err(ConfigError::ShellExpansion)?
            .into_owned();

        Ok(Self::new(expanded))
    }
}

impl Display for ConfigPath {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_path().to_string_lossy().as_ref())
    }
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("SITES", "/srv/sites")])]
    fn deserialize_setup_config() -> anyhow::Result<()> {
        let result: SetupConfig = r#"
            [settings]
            resource_root = "${SITES}/shared/platformsh"
            project_dir = "$SITES/shop"
        "#
        .parse()?;

        let expect = SetupConfig {
            settings: SetupSettings {
                resource_root: Some(ConfigPath::new("/srv/sites/shared/platformsh")),
                project_dir: Some(ConfigPath::new("/srv/sites/shop")),
            },
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn deserialize_empty_setup_config() -> anyhow::Result<()> {
        let result: SetupConfig = "".parse()?;
        assert_eq!(result, SetupConfig::default());

        Ok(())
    }

    #[test]
    fn deserialize_reports_unset_variable() {
        let result = r#"
            [settings]
            project_dir = "$IBEXA_POSTINSTALL_UNSET_SITES/shop"
        "#
        .parse::<SetupConfig>();

        assert!(matches!(result, Err(ConfigError::ShellExpansion(_))));
    }

    #[test]
    fn serialize_setup_config() {
        let result = SetupConfig {
            settings: SetupSettings {
                resource_root: Some(ConfigPath::new("/srv/sites/shared/platformsh")),
                project_dir: None,
            },
        }
        .to_string();

        let expect = indoc! {r#"
            [settings]
            resource_root = "/srv/sites/shared/platformsh"
        "#};

        assert_eq!(result, expect);
    }
}
