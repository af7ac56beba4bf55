// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Alias store management and manipulation.
//!
//! Dotme remembers repositories the user applies often under short names
//! called __aliases__. The alias store keeps these aliases together with the
//! default include and exclude patterns in one configuration file.
//!
//! # Store Layout
//!
//! The store is a single TOML file following the [`Settings`] layout. It can
//! be placed anywhere on the user's file system, but the default location is
//! `$XDG_CONFIG_HOME/dotme/config.toml`. A missing file is treated as an empty
//! store, and is only created once the store is modified for the first time.
//! Every modification is written back to the file immediately.

use crate::{config::Settings, filter::FilterConfig};

use std::{
    fs::{read_to_string, write},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Persistent mapping of aliases to repository URLs.
#[derive(Debug, Clone)]
pub struct AliasStore {
    path: PathBuf,
    settings: Settings,
}

impl AliasStore {
    /// Open alias store at target path.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::ReadConfig`] if configuration file exists, but
    ///   cannot be read.
    /// - Return [`StoreError::Config`] if configuration file cannot be parsed.
    #[instrument(skip(path), level = "debug")]
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("open alias store at {:?}", path.display());

        let settings = match read_to_string(&path) {
            Ok(content) => content.parse()?,
            Err(err) if err.kind() == ErrorKind::NotFound => Settings::default(),
            Err(err) => {
                return Err(StoreError::ReadConfig {
                    source: err,
                    config_path: path,
                })
            }
        };

        Ok(Self { path, settings })
    }

    /// Path to configuration file backing the store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save repository URL under new alias.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::AliasExists`] if alias is already taken.
    /// - Return [`StoreError::WriteConfig`] if store cannot be persisted.
    pub fn save_alias(&mut self, alias: impl Into<String>, url: impl Into<String>) -> Result<()> {
        let alias = alias.into();
        if self.settings.repositories.contains_key(&alias) {
            return Err(StoreError::AliasExists { alias });
        }

        self.settings.repositories.insert(alias, url.into());
        self.persist()
    }

    /// Look up repository URL of alias.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::AliasNotFound`] if alias does not exist.
    pub fn get_alias(&self, alias: impl AsRef<str>) -> Result<&str> {
        self.settings
            .repositories
            .get(alias.as_ref())
            .map(String::as_str)
            .ok_or_else(|| StoreError::AliasNotFound {
                alias: alias.as_ref().into(),
            })
    }

    /// Remove alias from store.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::AliasNotFound`] if alias does not exist.
    /// - Return [`StoreError::WriteConfig`] if store cannot be persisted.
    pub fn remove_alias(&mut self, alias: impl AsRef<str>) -> Result<()> {
        if self.settings.repositories.remove(alias.as_ref()).is_none() {
            return Err(StoreError::AliasNotFound {
                alias: alias.as_ref().into(),
            });
        }

        self.persist()
    }

    /// Iterate through aliases and their repository URLs by alias name.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.settings
            .repositories
            .iter()
            .map(|(alias, url)| (alias.as_str(), url.as_str()))
    }

    /// Default patterns to use when none are given explicitly.
    pub fn default_patterns(&self) -> &FilterConfig {
        &self.settings.default_patterns
    }

    /// Replace default patterns.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::WriteConfig`] if store cannot be persisted.
    pub fn set_default_patterns(&mut self, patterns: FilterConfig) -> Result<()> {
        self.settings.default_patterns = patterns;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let write_err = |err: std::io::Error| StoreError::WriteConfig {
            source: err,
            config_path: self.path.clone(),
        };

        // INVARIANT: Create parent directory of configuration file if needed.
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            mkdirp::mkdirp(parent).map_err(write_err)?;
        }

        debug!("write alias store to {:?}", self.path.display());
        write(&self.path, self.settings.to_string()).map_err(write_err)
    }
}

/// All possible error types for alias store interaction.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Alias is already taken.
    #[error("alias {alias:?} already exists")]
    AliasExists { alias: String },

    /// Alias does not exist.
    #[error("alias {alias:?} not found")]
    AliasNotFound { alias: String },

    /// Configuration file cannot be read from.
    #[error("failed to read from configuration file at {:?}", config_path.display())]
    ReadConfig {
        #[source]
        source: std::io::Error,
        config_path: PathBuf,
    },

    /// Configuration file cannot be written to.
    #[error("failed to write to configuration file at {:?}", config_path.display())]
    WriteConfig {
        #[source]
        source: std::io::Error,
        config_path: PathBuf,
    },

    /// Configuration file cannot be parsed.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

/// Friendly result alias :3
pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test]
    fn open_missing_store_is_empty() -> anyhow::Result<()> {
        let store = AliasStore::open("config.toml")?;
        assert_eq!(store.aliases().count(), 0);
        assert!(store.default_patterns().is_empty());
        assert!(!Path::new("config.toml").exists());

        Ok(())
    }

    #[sealed_test]
    fn save_alias_persists_to_file() -> anyhow::Result<()> {
        let mut store = AliasStore::open("nested/dir/config.toml")?;
        store.save_alias("work", "https://blah.org/work.git")?;
        store.save_alias("home", "https://blah.org/home.git")?;

        let store = AliasStore::open("nested/dir/config.toml")?;
        assert_eq!(store.get_alias("work")?, "https://blah.org/work.git");
        assert_eq!(
            store.aliases().collect::<Vec<_>>(),
            [
                ("home", "https://blah.org/home.git"),
                ("work", "https://blah.org/work.git"),
            ]
        );

        Ok(())
    }

    #[sealed_test]
    fn save_alias_rejects_duplicate() -> anyhow::Result<()> {
        let mut store = AliasStore::open("config.toml")?;
        store.save_alias("work", "https://blah.org/work.git")?;

        let result = store.save_alias("work", "https://blah.org/other.git");
        assert!(matches!(result, Err(StoreError::AliasExists { .. })));
        assert_eq!(store.get_alias("work")?, "https://blah.org/work.git");

        Ok(())
    }

    #[sealed_test]
    fn get_and_remove_missing_alias() -> anyhow::Result<()> {
        let mut store = AliasStore::open("config.toml")?;
        assert!(matches!(store.get_alias("nope"), Err(StoreError::AliasNotFound { .. })));
        assert!(matches!(store.remove_alias("nope"), Err(StoreError::AliasNotFound { .. })));

        Ok(())
    }

    #[sealed_test]
    fn remove_alias_persists_to_file() -> anyhow::Result<()> {
        let mut store = AliasStore::open("config.toml")?;
        store.save_alias("work", "https://blah.org/work.git")?;
        store.save_alias("home", "https://blah.org/home.git")?;
        store.remove_alias("work")?;

        let store = AliasStore::open("config.toml")?;
        assert_eq!(
            store.aliases().collect::<Vec<_>>(),
            [("home", "https://blah.org/home.git")]
        );

        Ok(())
    }

    #[sealed_test]
    fn set_default_patterns_persists_to_file() -> anyhow::Result<()> {
        std::fs::write(
            "config.toml",
            indoc! {r#"
                [repositories]
                work = "https://blah.org/work.git"
            "#},
        )?;

        let mut store = AliasStore::open("config.toml")?;
        let patterns = FilterConfig::new([".vscode", ".gitconfig"], [".DS_Store"]);
        store.set_default_patterns(patterns.clone())?;

        let store = AliasStore::open("config.toml")?;
        assert_eq!(store.default_patterns(), &patterns);
        assert_eq!(store.get_alias("work")?, "https://blah.org/work.git");

        Ok(())
    }

    #[sealed_test]
    fn open_malformed_store_fails() -> anyhow::Result<()> {
        std::fs::write("config.toml", "[repositories\nwork = ")?;

        let result = AliasStore::open("config.toml");
        assert!(matches!(result, Err(StoreError::Config(_))));

        Ok(())
    }
}
