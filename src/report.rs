// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Copy report.
//!
//! Record of what a single walk over a cloned repository copied and ignored,
//! along with the filter configuration that was active at the time. The
//! [`Display`] implementation renders the summary shown to the user.

use crate::filter::FilterConfig;

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

/// Result of one selective copy.
///
/// # Invariant
///
/// - Names are kept in the order the walk visited them.
/// - Copied directories carry a trailing `/`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CopyReport {
    copied: Vec<String>,
    ignored: Vec<String>,
    overwritten: Vec<PathBuf>,
    filter: FilterConfig,
}

impl CopyReport {
    /// Construct new empty report for given filter configuration.
    pub fn new(filter: FilterConfig) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub(crate) fn record_copied_file(&mut self, name: impl Into<String>) {
        self.copied.push(name.into());
    }

    pub(crate) fn record_copied_dir(&mut self, name: impl Into<String>) {
        let mut name = name.into();
        name.push('/');
        self.copied.push(name);
    }

    pub(crate) fn record_ignored(&mut self, name: impl Into<String>) {
        self.ignored.push(name.into());
    }

    pub(crate) fn record_overwritten(&mut self, path: impl Into<PathBuf>) {
        self.overwritten.push(path.into());
    }

    /// Top-level entries that were copied.
    pub fn copied(&self) -> &[String] {
        &self.copied
    }

    /// Top-level entries that were filtered out.
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    /// Destination files that already existed and were overwritten.
    pub fn overwritten(&self) -> impl Iterator<Item = &Path> {
        self.overwritten.iter().map(PathBuf::as_path)
    }

    /// Filter configuration the walk was performed with.
    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }
}

impl Display for CopyReport {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        writeln!(fmt, "summary:")?;
        write_listing(fmt, "copied", &self.copied)?;
        write_listing(fmt, "ignored", &self.ignored)?;

        if !self.filter.is_empty() {
            writeln!(fmt, "active filters:")?;
            if !self.filter.include.is_empty() {
                writeln!(fmt, "    include: {}", self.filter.include.join(", "))?;
            }

            if !self.filter.exclude.is_empty() {
                writeln!(fmt, "    exclude: {}", self.filter.exclude.join(", "))?;
            }
        }

        Ok(())
    }
}

fn write_listing(fmt: &mut Formatter<'_>, label: &str, names: &[String]) -> FmtResult {
    let noun = if names.len() == 1 { "entry" } else { "entries" };
    writeln!(fmt, "{label} {} {noun}", names.len())?;
    for name in names {
        writeln!(fmt, "    - {name}")?;
    }

    Ok(())
}
