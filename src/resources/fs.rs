//! File-system resource helpers.
use anyhow::{Context as _, Result};
use std::io;
use std::path::{Path, PathBuf};

use super::{Resource, ResourceChange, ResourceState};

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// What [`remove_path`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Something existed and was deleted.
    Removed,
    /// Nothing was there.
    Absent,
}

/// Delete a file, symlink, or directory tree at `path`.
///
/// Symlinks are removed themselves, never their targets.
///
/// # Errors
///
/// Returns an error if `path` exists but cannot be removed.
pub fn remove_path(path: &Path) -> Result<Removal> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Removal::Absent),
        Err(e) => {
            return Err(anyhow::Error::new(e).context(format!("inspecting {}", path.display())));
        }
    };
    if meta.is_dir() {
        std::fs::remove_dir_all(path)
            .with_context(|| format!("removing directory {}", path.display()))?;
    } else {
        std::fs::remove_file(path).with_context(|| format!("removing {}", path.display()))?;
    }
    Ok(Removal::Removed)
}

/// Set mode `0o755` on `path`.
///
/// # Errors
///
/// Returns an error if the permissions cannot be changed.
pub fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt as _;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .with_context(|| format!("setting permissions on {}", path.display()))
}

/// Whether `path` is a regular file (following symlinks) with any execute bit.
#[must_use]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt as _;
    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

/// A directory that must exist.
#[derive(Debug)]
pub struct DirectoryResource {
    path: PathBuf,
}

impl DirectoryResource {
    /// Create a resource for `path`.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Resource for DirectoryResource {
    fn current_state(&self) -> Result<ResourceState> {
        Ok(if self.path.is_dir() {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        })
    }

    fn apply(&self) -> Result<ResourceChange> {
        std::fs::create_dir_all(&self.path)
            .with_context(|| format!("creating directory {}", self.path.display()))?;
        Ok(ResourceChange::Applied)
    }
}
