// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for external files that need to be
//! interacted with, or managed in some way.

use std::{env, path::PathBuf};

/// Environment variable that overrides the configuration file location.
pub const CONFIG_ENV: &str = "DOTME_CONFIG";

/// Determine default absolute path to configuration file.
///
/// Uses `$DOTME_CONFIG` with shell expansion applied if it is set.
/// Otherwise, uses XDG Base Directory path `$XDG_CONFIG_HOME/dotme/config.toml`.
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if configuration directory cannot be
///   determined.
/// - Return [`PathError::ShellExpansion`] if `$DOTME_CONFIG` cannot be
///   expanded.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return Ok(PathBuf::from(shellexpand::full(&path)?.into_owned()));
        }
    }

    dirs::config_dir()
        .map(|path| path.join("dotme").join("config.toml"))
        .ok_or(PathError::NoWayHome)
}

/// Path resolution error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum PathError {
    /// No way to determine user's configuration directory.
    ///
    /// # See Also
    ///
    /// - [`dirs::config_dir`](https://docs.rs/dirs/latest/dirs/fn.config_dir.html)
    #[error("cannot determine absolute path to user's configuration directory")]
    NoWayHome,

    /// Failed to perform shell expansion on configuration path override.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<env::VarError>),
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;
