// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Apply dotfiles from a repository.
//!
//! Glue a [`Retrieval`] and the selective copy together: clone the repository,
//! copy what passes the filter into the destination directory, and hand back
//! the resulting report. The clone is removed once the copy finishes, whether
//! it succeeded or not.

use crate::{
    clone::Retrieval,
    copy::copy_selected,
    filter::FilterConfig,
    report::CopyReport,
};

use std::path::Path;
use tracing::{info, instrument};

/// Clone repository at URL and copy its selected top-level entries.
///
/// The filter configuration must already be resolved, i.e., any fallback to
/// default patterns happens before calling this.
///
/// # Errors
///
/// - Return [`ApplyError::Clone`] if repository cannot be retrieved.
/// - Return [`ApplyError::Copy`] if selective copy fails.
#[instrument(skip(retrieval, dest, filter), level = "debug")]
pub fn apply(
    retrieval: &impl Retrieval,
    url: &str,
    dest: impl AsRef<Path>,
    filter: &FilterConfig,
) -> Result<CopyReport> {
    let clone = retrieval.retrieve(url)?;
    info!("scanning for dotfiles");
    let report = copy_selected(clone.path(), dest, filter)?;

    Ok(report)
}

/// Dotfile application error types.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// Repository cannot be retrieved.
    #[error(transparent)]
    Clone(#[from] crate::clone::CloneError),

    /// Selective copy fails.
    #[error(transparent)]
    Copy(#[from] crate::copy::CopyError),
}

/// Friendly result alias :3
pub type Result<T, E = ApplyError> = std::result::Result<T, E>;
