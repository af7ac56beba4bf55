// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Selective copy of top-level entries.
//!
//! Walk the top-level of a source tree, decide which entries make it through
//! the [`FilterConfig`], and copy them into a destination tree.
//!
//! # Walk Rules
//!
//! Filtering only happens at the top-level. Once a directory is selected, its
//! entire subtree is copied as is. The `.git` entry of the source tree is
//! skipped before any filter is consulted, because clone metadata is never
//! part of the payload.
//!
//! Existing destination files are overwritten. Each overwrite is reported
//! through a warning and recorded in the [`CopyReport`]. A failure aborts the
//! walk, leaving whatever was already copied in place.
//!
//! Entries are visited in file name order at every level so that the
//! resulting report does not depend on the order the file system happens to
//! list directories in.

use crate::{filter::FilterConfig, report::CopyReport};

use std::{
    fs::{self, DirEntry, File},
    io,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument, warn};

/// Name of clone metadata entry that is never copied.
pub const GIT_DIR: &str = ".git";

/// Copy top-level entries of source root that pass filter into destination.
///
/// # Errors
///
/// - Return [`CopyError::ReadDir`] if a source directory cannot be listed.
/// - Return [`CopyError::CreateDir`] if a destination directory cannot be
///   created.
/// - Return [`CopyError::OpenSource`], [`CopyError::CreateDest`], or
///   [`CopyError::Transfer`] if file content cannot be copied.
/// - Return [`CopyError::Permissions`] if permission bits cannot be
///   replicated.
#[instrument(skip(source_root, dest_root, filter), level = "debug")]
pub fn copy_selected(
    source_root: impl AsRef<Path>,
    dest_root: impl AsRef<Path>,
    filter: &FilterConfig,
) -> Result<CopyReport> {
    let (source_root, dest_root) = (source_root.as_ref(), dest_root.as_ref());
    debug!(
        "scan {:?} for entries to copy into {:?}",
        source_root.display(),
        dest_root.display()
    );

    let mut report = CopyReport::new(filter.clone());
    for entry in sorted_entries(source_root)? {
        let name = entry.file_name().to_string_lossy().into_owned();

        // INVARIANT: Clone metadata is skipped before filtering.
        if name == GIT_DIR {
            continue;
        }

        if !filter.should_include(&name) {
            debug!("ignore {name:?}");
            report.record_ignored(name);
            continue;
        }

        let source = entry.path();
        let dest = dest_root.join(entry.file_name());
        if is_dir(&entry)? {
            copy_dir(&source, &dest, &mut report)?;
            report.record_copied_dir(name);
        } else {
            copy_file(&source, &dest, &mut report)?;
            report.record_copied_file(name);
        }
    }

    Ok(report)
}

/// Copy directory and its entire subtree without any filtering.
fn copy_dir(source: &Path, dest: &Path, report: &mut CopyReport) -> Result<()> {
    let create_err = |err: io::Error| CopyError::CreateDir {
        source: err,
        path: dest.to_path_buf(),
    };

    mkdirp::mkdirp(dest).map_err(create_err)?;

    // INVARIANT: An existing non-directory at destination is not a directory
    // that was created.
    if !dest.is_dir() {
        return Err(create_err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "destination exists and is not a directory",
        )));
    }

    for entry in sorted_entries(source)? {
        let source = entry.path();
        let dest = dest.join(entry.file_name());
        if is_dir(&entry)? {
            copy_dir(&source, &dest, report)?;
        } else {
            copy_file(&source, &dest, report)?;
        }
    }

    Ok(())
}

/// Stream file content into destination and replicate its permission bits.
fn copy_file(source: &Path, dest: &Path, report: &mut CopyReport) -> Result<()> {
    if let Ok(existing) = fs::symlink_metadata(dest) {
        warn!("{:?} already exists, overwriting", dest.display());
        report.record_overwritten(dest);

        // INVARIANT: A read-only leftover from a previous run must not block
        // the overwrite.
        if existing.is_file() && existing.permissions().readonly() {
            fs::set_permissions(dest, owner_writable(existing.permissions())).map_err(|err| {
                CopyError::Permissions {
                    source: err,
                    path: dest.to_path_buf(),
                }
            })?;
        }
    }

    let mut reader = File::open(source).map_err(|err| CopyError::OpenSource {
        source: err,
        path: source.to_path_buf(),
    })?;
    let perms = reader
        .metadata()
        .map_err(|err| CopyError::OpenSource {
            source: err,
            path: source.to_path_buf(),
        })?
        .permissions();

    let mut writer = File::create(dest).map_err(|err| CopyError::CreateDest {
        source: err,
        path: dest.to_path_buf(),
    })?;
    io::copy(&mut reader, &mut writer).map_err(|err| CopyError::Transfer {
        source: err,
        from: source.to_path_buf(),
        to: dest.to_path_buf(),
    })?;

    fs::set_permissions(dest, perms).map_err(|err| CopyError::Permissions {
        source: err,
        path: dest.to_path_buf(),
    })?;
    debug!("copied {:?}", dest.display());

    Ok(())
}

#[cfg(unix)]
fn owner_writable(mut perms: fs::Permissions) -> fs::Permissions {
    use std::os::unix::fs::PermissionsExt;
    perms.set_mode(perms.mode() | 0o200);
    perms
}

#[cfg(not(unix))]
fn owner_writable(mut perms: fs::Permissions) -> fs::Permissions {
    perms.set_readonly(false);
    perms
}

fn sorted_entries(dir: &Path) -> Result<Vec<DirEntry>> {
    let read_err = |err: io::Error| CopyError::ReadDir {
        source: err,
        path: dir.to_path_buf(),
    };

    let mut entries = fs::read_dir(dir)
        .map_err(read_err)?
        .collect::<io::Result<Vec<_>>>()
        .map_err(read_err)?;
    entries.sort_by_key(DirEntry::file_name);

    Ok(entries)
}

fn is_dir(entry: &DirEntry) -> Result<bool> {
    entry
        .file_type()
        .map(|kind| kind.is_dir())
        .map_err(|err| CopyError::ReadDir {
            source: err,
            path: entry.path(),
        })
}

/// Selective copy error types.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// Directory cannot be listed.
    #[error("failed to read directory {:?}", path.display())]
    ReadDir {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Destination directory cannot be created.
    #[error("failed to create directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Source file cannot be opened.
    #[error("failed to open source file {:?}", path.display())]
    OpenSource {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Destination file cannot be created or truncated.
    #[error("failed to create destination file {:?}", path.display())]
    CreateDest {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// File content cannot be streamed into destination.
    #[error("failed to copy file content from {:?} to {:?}", from.display(), to.display())]
    Transfer {
        #[source]
        source: io::Error,
        from: PathBuf,
        to: PathBuf,
    },

    /// Permission bits cannot be set on destination.
    #[error("failed to set permissions of {:?}", path.display())]
    Permissions {
        #[source]
        source: io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = CopyError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs::{create_dir_all, read_to_string, write};

    // Lays out the usual clone: dotfiles, a dot directory, and clutter.
    fn source_fixture(root: &Path) -> anyhow::Result<()> {
        create_dir_all(root.join(".vscode"))?;
        create_dir_all(root.join(".git").join("objects"))?;
        write(root.join(".gitconfig"), "git config content")?;
        write(root.join(".vscode").join("settings.json"), "vscode settings")?;
        write(root.join(".DS_Store"), "finder junk")?;
        write(root.join("README.md"), "# dotfiles")?;
        write(root.join(".git").join("HEAD"), "ref: refs/heads/main")?;
        Ok(())
    }

    #[sealed_test]
    fn copy_selected_dotfiles_by_default() -> anyhow::Result<()> {
        source_fixture(Path::new("src"))?;
        create_dir_all("dest")?;

        let report = copy_selected("src", "dest", &FilterConfig::default())?;
        assert_eq!(report.copied(), [".DS_Store", ".gitconfig", ".vscode/"]);
        assert_eq!(report.ignored(), ["README.md"]);
        assert_eq!(report.overwritten().count(), 0);

        assert_eq!(read_to_string("dest/.gitconfig")?, "git config content");
        assert_eq!(read_to_string("dest/.vscode/settings.json")?, "vscode settings");
        assert!(!Path::new("dest/.git").exists());
        assert!(!Path::new("dest/README.md").exists());

        Ok(())
    }

    #[sealed_test]
    fn copy_selected_never_reports_git_dir() -> anyhow::Result<()> {
        source_fixture(Path::new("src"))?;
        create_dir_all("dest")?;

        let filter = FilterConfig::new(["*"], Vec::<String>::new());
        let report = copy_selected("src", "dest", &filter)?;
        assert_eq!(report.copied(), [".DS_Store", ".gitconfig", ".vscode/", "README.md"]);
        assert!(report.ignored().is_empty());
        assert!(!Path::new("dest/.git").exists());

        Ok(())
    }

    #[sealed_test]
    fn copy_selected_applies_filters_at_top_level_only() -> anyhow::Result<()> {
        source_fixture(Path::new("src"))?;
        write("src/.vscode/.DS_Store", "nested junk")?;
        create_dir_all("dest")?;

        let filter = FilterConfig::new(Vec::<String>::new(), [".DS_*"]);
        let report = copy_selected("src", "dest", &filter)?;
        assert_eq!(report.copied(), [".gitconfig", ".vscode/"]);
        assert_eq!(report.ignored(), [".DS_Store", "README.md"]);
        assert_eq!(report.filter(), &filter);
        assert_eq!(read_to_string("dest/.vscode/.DS_Store")?, "nested junk");

        Ok(())
    }

    #[sealed_test]
    fn copy_selected_overwrites_existing_files() -> anyhow::Result<()> {
        source_fixture(Path::new("src"))?;
        create_dir_all("dest")?;
        write("dest/.gitconfig", "stale content")?;

        let first = copy_selected("src", "dest", &FilterConfig::default())?;
        assert_eq!(first.overwritten().collect::<Vec<_>>(), [Path::new("dest/.gitconfig")]);
        assert_eq!(read_to_string("dest/.gitconfig")?, "git config content");

        let second = copy_selected("src", "dest", &FilterConfig::default())?;
        assert_eq!(second.overwritten().count(), 3);
        assert_eq!(second.copied(), first.copied());
        assert_eq!(read_to_string("dest/.gitconfig")?, "git config content");
        assert_eq!(read_to_string("dest/.vscode/settings.json")?, "vscode settings");

        Ok(())
    }

    #[cfg(unix)]
    #[sealed_test]
    fn copy_selected_preserves_permission_bits() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        create_dir_all("src/.local/bin")?;
        create_dir_all("dest")?;
        write("src/.local/bin/hello", "#!/bin/sh\necho hello\n")?;
        write("src/.netrc", "machine example.com")?;
        fs::set_permissions("src/.local/bin/hello", fs::Permissions::from_mode(0o755))?;
        fs::set_permissions("src/.netrc", fs::Permissions::from_mode(0o600))?;

        copy_selected("src", "dest", &FilterConfig::default())?;
        let mode = fs::metadata("dest/.local/bin/hello")?.permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        let mode = fs::metadata("dest/.netrc")?.permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        Ok(())
    }

    #[sealed_test]
    fn copy_selected_fails_when_directory_lands_on_file() -> anyhow::Result<()> {
        create_dir_all("src/.emptydir")?;
        create_dir_all("src/.nonempty")?;
        write("src/.nonempty/x", "x")?;
        write("src/.aaa", "copied first")?;
        create_dir_all("dest")?;
        write("dest/.emptydir", "in the way")?;
        write("dest/.nonempty", "in the way")?;

        let result = copy_selected("src", "dest", &FilterConfig::default());
        match result {
            Err(CopyError::CreateDir { path, .. }) => assert_eq!(path, Path::new("dest/.emptydir")),
            other => panic!("expected directory creation failure, got {other:?}"),
        }
        assert_eq!(read_to_string("dest/.aaa")?, "copied first");
        assert!(!Path::new("dest/.emptydir").is_dir());

        fs::remove_file("dest/.emptydir")?;
        let result = copy_selected("src", "dest", &FilterConfig::default());
        match result {
            Err(CopyError::CreateDir { path, .. }) => assert_eq!(path, Path::new("dest/.nonempty")),
            other => panic!("expected directory creation failure, got {other:?}"),
        }
        assert!(Path::new("dest/.emptydir").is_dir());

        Ok(())
    }

    #[sealed_test]
    fn copy_selected_keeps_earlier_entries_on_file_failure() -> anyhow::Result<()> {
        source_fixture(Path::new("src"))?;
        write("src/.zshrc", "setopt autocd")?;
        create_dir_all("dest/.zshrc")?;

        let result = copy_selected("src", "dest", &FilterConfig::default());
        match result {
            Err(CopyError::CreateDest { path, .. }) => assert_eq!(path, Path::new("dest/.zshrc")),
            other => panic!("expected destination file failure, got {other:?}"),
        }
        assert_eq!(read_to_string("dest/.gitconfig")?, "git config content");
        assert_eq!(read_to_string("dest/.vscode/settings.json")?, "vscode settings");
        assert!(Path::new("dest/.DS_Store").exists());

        Ok(())
    }

    #[cfg(unix)]
    #[sealed_test]
    fn copy_selected_overwrites_read_only_leftover_owner_writable() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        create_dir_all("src")?;
        create_dir_all("dest")?;
        write("src/.netrc", "machine example.com")?;
        fs::set_permissions("src/.netrc", fs::Permissions::from_mode(0o400))?;
        write("dest/.netrc", "stale")?;
        fs::set_permissions("dest/.netrc", fs::Permissions::from_mode(0o400))?;

        let perms = owner_writable(fs::metadata("dest/.netrc")?.permissions());
        assert_eq!(perms.mode() & 0o777, 0o600);

        let report = copy_selected("src", "dest", &FilterConfig::default())?;
        assert_eq!(report.overwritten().count(), 1);
        assert_eq!(read_to_string("dest/.netrc")?, "machine example.com");
        let mode = fs::metadata("dest/.netrc")?.permissions().mode();
        assert_eq!(mode & 0o777, 0o400);

        Ok(())
    }

    #[sealed_test]
    fn copy_selected_fails_on_missing_source() {
        create_dir_all("dest").unwrap();

        let result = copy_selected("missing", "dest", &FilterConfig::default());
        assert!(matches!(result, Err(CopyError::ReadDir { .. })));
    }
}
