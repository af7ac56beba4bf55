// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Apply dotfiles from the top-level of a Git repository.
//!
//! Dotme clones a repository, and copies the files and directories at its
//! top-level whose names begin with a dot into a destination directory. What
//! gets copied can be narrowed or widened through include and exclude glob
//! patterns, see [`filter`] for the exact rules.
//!
//! Repository URLs can be saved under short aliases, and default patterns can
//! be kept for runs that do not supply any. Both live in the [`store`].

pub mod apply;
pub mod clone;
pub mod config;
pub mod copy;
pub mod filter;
pub mod path;
pub mod report;
pub mod store;

pub use apply::apply;
pub use copy::copy_selected;
pub use filter::{is_dotfile, parse_patterns, should_include, FilterConfig};
pub use report::CopyReport;
