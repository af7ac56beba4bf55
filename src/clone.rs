// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Repository retrieval.
//!
//! Dotme never applies dotfiles from an existing checkout. Each run clones the
//! target repository into a fresh temporary directory, applies the dotfiles
//! found at the top-level of its working tree, and throws the clone away
//! afterwards.

use auth_git2::{GitAuthenticator, Prompter};
use git2::{build::RepoBuilder, Config, FetchOptions, RemoteCallbacks};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Password, Text};
use std::{path::Path, time};
use tempfile::TempDir;
use tracing::{info, instrument};

/// Layer of indirection for repository retrieval.
pub trait Retrieval {
    /// Clone repository at URL into a local working tree.
    fn retrieve(&self, url: &str) -> Result<ClonedRepository>;
}

/// Working tree of a cloned repository.
///
/// The working tree lives in a temporary directory that is removed once the
/// clone is dropped.
#[derive(Debug)]
pub struct ClonedRepository {
    dir: TempDir,
    branch: Option<String>,
}

impl ClonedRepository {
    /// Construct new cloned repository from its temporary directory.
    pub fn new(dir: TempDir, branch: Option<String>) -> Self {
        Self { dir, branch }
    }

    /// Path to working tree of the clone.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Short name of branch that was checked out, if HEAD resolves to one.
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }
}

/// Repository retrieval through libgit2.
#[derive(Debug, Clone)]
pub struct Git2Retrieval {
    bar: ProgressBar,
}

impl Git2Retrieval {
    /// Construct new libgit2 retrieval reporting progress through given bar.
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Default for Git2Retrieval {
    fn default() -> Self {
        Self::new(ProgressBar::new(0))
    }
}

impl Retrieval for Git2Retrieval {
    /// Clone repository into temporary directory.
    ///
    /// The progress of the clone is displayed through a progress bar. If any
    /// credentials are required for the clone to continue, then the user will
    /// be prompted for that information accordingly. The progress bar will be
    /// blocked for user input.
    ///
    /// # Errors
    ///
    /// - Return [`CloneError::TempDir`] if temporary directory cannot be
    ///   created.
    /// - Return [`CloneError::Git2`] if libgit2 operations fail.
    /// - Return [`CloneError::IndicatifStyleTemplate`] if progress bar style
    ///   is invalid.
    #[instrument(skip(self), level = "debug")]
    fn retrieve(&self, url: &str) -> Result<ClonedRepository> {
        let dir = tempfile::Builder::new()
            .prefix("dotme-")
            .tempdir()
            .map_err(CloneError::TempDir)?;
        info!("cloning repository: {url}");

        let style = ProgressStyle::with_template(
            "{elapsed_precise:.green}  {msg:<50}  [{wide_bar:.yellow/blue}]",
        )?
        .progress_chars("-Cco.");
        self.bar.set_style(style);
        self.bar.set_message(url.to_string());
        self.bar.enable_steady_tick(time::Duration::from_millis(100));

        let prompter = IndicatifPrompter::new(self.bar.clone());
        let authenticator = GitAuthenticator::default().set_prompter(prompter.clone());
        let config = Config::open_default()?;

        let mut throttle = time::Instant::now();
        let mut rc = RemoteCallbacks::new();
        rc.credentials(authenticator.credentials(&config));
        rc.transfer_progress(|progress| {
            let stats = progress.to_owned();
            let bar_size = stats.total_objects() as u64;
            let bar_pos = stats.received_objects() as u64;
            if throttle.elapsed() > time::Duration::from_millis(10) {
                throttle = time::Instant::now();
                prompter.bar.set_length(bar_size);
                prompter.bar.set_position(bar_pos);
            }
            true
        });

        let mut fo = FetchOptions::new();
        fo.remote_callbacks(rc);
        let result = RepoBuilder::new().fetch_options(fo).clone(url, dir.path());
        self.bar.finish_and_clear();
        let repository = result?;

        // INVARIANT: Unborn or detached HEAD simply has no branch to report.
        let branch = repository
            .head()
            .ok()
            .filter(|head| head.is_branch())
            .and_then(|head| head.shorthand().map(ToString::to_string));
        match &branch {
            Some(branch) => info!("repository cloned, using branch: {branch}"),
            None => info!("repository cloned"),
        }

        Ok(ClonedRepository::new(dir, branch))
    }
}

/// Git2 authentication prompter for progress bar.
#[derive(Debug, Clone)]
pub struct IndicatifPrompter {
    pub(crate) bar: ProgressBar,
}

impl IndicatifPrompter {
    /// Construct new progress bar authenticator.
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Prompter for IndicatifPrompter {
    #[instrument(skip(self, url, _config), level = "debug")]
    fn prompt_username_password(
        &mut self,
        url: &str,
        _config: &git2::Config,
    ) -> Option<(String, String)> {
        info!("authentication required at {url}");
        self.bar.suspend(|| -> Option<(String, String)> {
            let username = Text::new("username").prompt().ok()?;
            let password = Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()?;
            Some((username, password))
        })
    }

    #[instrument(skip(self, username, url, _config), level = "debug")]
    fn prompt_password(
        &mut self,
        username: &str,
        url: &str,
        _config: &git2::Config,
    ) -> Option<String> {
        info!("authentication required at {url} for user {username}");
        self.bar.suspend(|| -> Option<String> {
            Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()
        })
    }

    #[instrument(skip(self, ssh_key_path, _config), level = "debug")]
    fn prompt_ssh_key_passphrase(
        &mut self,
        ssh_key_path: &Path,
        _config: &git2::Config,
    ) -> Option<String> {
        info!(
            "authentication required with ssh key at {}",
            ssh_key_path.display()
        );
        self.bar.suspend(|| -> Option<String> {
            Password::new("passphrase")
                .without_confirmation()
                .prompt()
                .ok()
        })
    }
}

/// Repository retrieval error types.
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    /// Temporary directory for the clone cannot be created.
    #[error("failed to create temporary directory for clone")]
    TempDir(#[source] std::io::Error),

    /// Style template cannot be set for progress bars.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),

    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),
}

/// Friendly result alias :3
pub type Result<T, E = CloneError> = std::result::Result<T, E>;
