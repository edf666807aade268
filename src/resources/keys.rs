//! Key-file cleanup.
//!
//! Only deletes files; the key directories themselves are left in place.
use std::path::{Path, PathBuf};

use super::fs::{Removal, remove_path};
use super::search::{SearchLimits, find_all};
use crate::config::KeyLocations;

/// `<name>.pub` and `<name>.key`.
#[must_use]
pub fn key_file_names(name: &str) -> [String; 2] {
    [format!("{name}.pub"), format!("{name}.key")]
}

/// Files removed and files that could not be removed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Purge {
    /// Deleted files.
    pub removed: Vec<PathBuf>,
    /// Files that could not be deleted, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl Purge {
    fn remove(&mut self, path: &Path) {
        if self.removed.iter().any(|p| p == path) {
            return;
        }
        match remove_path(path) {
            Ok(Removal::Removed) => self.removed.push(path.to_path_buf()),
            Ok(Removal::Absent) => {}
            Err(e) => self.failed.push((path.to_path_buf(), format!("{e:#}"))),
        }
    }
}

/// Delete `<name>.pub` and `<name>.key` from every existing key location.
#[must_use]
pub fn purge_named(locations: &KeyLocations, name: &str) -> Purge {
    let mut purge = Purge::default();
    let names = key_file_names(name);
    for dir in locations.existing() {
        for file in &names {
            purge.remove(&dir.join(file));
        }
    }
    purge
}

/// Delete stray `<name>.pub` / `<name>.key` files anywhere under `roots`.
pub fn sweep_named(purge: &mut Purge, roots: &[PathBuf], name: &str, limits: SearchLimits) {
    let names = key_file_names(name);
    let hits = find_all(roots, limits, |path, file_type| {
        !file_type.is_symlink()
            && path
                .file_name()
                .is_some_and(|n| names.iter().any(|k| n == k.as_str()))
    });
    for path in hits {
        purge.remove(&path);
    }
}

/// Delete named key files plus every file whose name contains `.key` in
/// each existing key location.
#[must_use]
pub fn purge_all(locations: &KeyLocations, name: &str, limits: SearchLimits) -> Purge {
    let mut purge = purge_named(locations, name);
    let roots: Vec<PathBuf> = locations.existing().map(Path::to_path_buf).collect();
    let hits = find_all(&roots, limits, |path, file_type| {
        file_type.is_file()
            && path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().contains(".key"))
    });
    for path in hits {
        purge.remove(&path);
    }
    purge
}
