// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the configuration file that dotme uses to simplify
//! the process of serialization and deserialization. File I/O is left to the
//! caller to figure out.

use crate::filter::FilterConfig;

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Settings layout.
///
/// # General Layout
///
/// The settings file is composed of two basic parts: repository aliases, and
/// default patterns. The repositories section maps short alias names to the
/// URL of a dotfile repository. The default patterns section holds the
/// include and exclude patterns to use whenever the user does not give any
/// on the command-line.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Repository URLs keyed by alias name.
    #[serde(default)]
    pub repositories: BTreeMap<String, String>,

    /// Patterns to fall back to when none are given explicitly.
    #[serde(default)]
    pub default_patterns: FilterConfig,
}

impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        toml::de::from_str(data).map_err(ConfigError::Deserialize)
    }
}

impl Display for Settings {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
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
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}
