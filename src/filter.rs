// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dotfile filtering.
//!
//! Decide which top-level entries of a cloned repository get copied into the
//! destination directory.
//!
//! # Filter Rules
//!
//! Without any patterns, only __dotfiles__ are selected, i.e., names that
//! start with a `.` character. Include patterns act as an allowlist that
//! replaces the dotfile rule entirely, so a plain `README.md` can be pulled
//! in by an include pattern like `README.*`. Exclude patterns are always a
//! veto applied after inclusion has been settled. They never select anything
//! on their own.
//!
//! # Pattern Syntax
//!
//! Patterns are shell-style globs matched against a single name: `*`, `?`,
//! and bracket classes like `[ci]` or `[!ci]`. Wildcards never cross a `/`.
//! Runs of `*` behave like a single `*`, so `.git**` is the same as `.git*`.
//! Backslash escapes are not understood. Use a bracket class like `[*]` or
//! `[?]` to match a literal wildcard character instead. A pattern that is not
//! valid glob syntax is compared literally.

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Include and exclude patterns for one copy operation.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Allowlist of patterns that replaces the dotfile rule when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,

    /// Patterns that veto an otherwise included name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl FilterConfig {
    /// Construct new filter configuration.
    pub fn new(
        include: impl IntoIterator<Item = impl Into<String>>,
        exclude: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    /// Construct filter configuration from raw comma-separated listings.
    pub fn parse(include: impl AsRef<str>, exclude: impl AsRef<str>) -> Self {
        Self {
            include: parse_patterns(include),
            exclude: parse_patterns(exclude),
        }
    }

    /// Check if neither include nor exclude patterns are present.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Fall back to a set of default patterns if no patterns were given.
    ///
    /// The fallback is all or nothing. Explicit patterns in either list keep
    /// the whole configuration as is.
    pub fn or_defaults(self, defaults: &FilterConfig) -> Self {
        if self.is_empty() {
            defaults.clone()
        } else {
            self
        }
    }

    /// Decide if entry name should be copied.
    ///
    /// See [`should_include`].
    pub fn should_include(&self, name: impl AsRef<str>) -> bool {
        should_include(name, self.include.as_slice(), self.exclude.as_slice())
    }
}

/// Decide if entry name should be copied under given patterns.
///
/// With no patterns at all, only dotfiles are included. Otherwise, a
/// non-empty include listing must match the name, or the name must be a
/// dotfile when the include listing is empty. Anything that passes is then
/// dropped if it matches any exclude pattern.
pub fn should_include(
    name: impl AsRef<str>,
    include: &[impl AsRef<str>],
    exclude: &[impl AsRef<str>],
) -> bool {
    let name = name.as_ref();
    if include.is_empty() && exclude.is_empty() {
        return is_dotfile(name);
    }

    let included = if include.is_empty() {
        is_dotfile(name)
    } else {
        include.iter().any(|pattern| matches(name, pattern))
    };

    if !included {
        return false;
    }

    !exclude.iter().any(|pattern| matches(name, pattern))
}

/// Check if name starts with a `.` character.
///
/// Both `.` and `..` count. Judged on the first character only, so this is
/// not a path predicate.
pub fn is_dotfile(name: impl AsRef<str>) -> bool {
    name.as_ref().starts_with('.')
}

/// Match name against a single glob pattern.
///
/// Falls back to exact comparison if the pattern cannot be compiled.
pub fn matches(name: impl AsRef<str>, pattern: impl AsRef<str>) -> bool {
    let (name, pattern) = (name.as_ref(), pattern.as_ref());
    match Pattern::new(&collapse_stars(pattern)) {
        Ok(glob) => glob.matches_with(name, MATCH_OPTIONS),
        Err(_) => name == pattern,
    }
}

// INVARIANT: `**` is only legal as a whole path component to the glob crate,
// but a single segment has no components to recurse into.
fn collapse_stars(pattern: &str) -> String {
    let mut collapsed = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '*' && collapsed.ends_with('*') {
            continue;
        }
        collapsed.push(c);
    }

    collapsed
}

/// Split comma-separated listing of patterns.
///
/// Each part is trimmed of ASCII whitespace, and blank parts are dropped.
pub fn parse_patterns(raw: impl AsRef<str>) -> Vec<String> {
    raw.as_ref()
        .split(',')
        .map(|part| part.trim_matches(|c: char| c.is_ascii_whitespace()))
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect()
}
