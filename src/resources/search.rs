//! Bounded filesystem search.
//!
//! Walks breadth-first from each root, never descends into symlinked
//! directories, stops at a maximum depth, and gives up once a deadline
//! passes. Unreadable directories are skipped silently.
use std::collections::VecDeque;
use std::fs::FileType;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::SearchSettings;

/// Depth and time limits for a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Deepest directory level visited; entries of a root are at depth 1.
    pub max_depth: usize,
    /// Wall-clock budget for the whole walk.
    pub timeout: Duration,
}

impl SearchLimits {
    /// Limits taken from the `[search]` settings.
    #[must_use]
    pub const fn from_settings(settings: &SearchSettings) -> Self {
        Self {
            max_depth: settings.max_depth,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::from_settings(&SearchSettings::default())
    }
}

/// Visit every non-directory entry under `roots` within `limits`.
///
/// Returns `true` if the walk was cut short by the deadline.
pub fn walk<F>(roots: &[PathBuf], limits: SearchLimits, mut visit: F) -> bool
where
    F: FnMut(&Path, &FileType) -> ControlFlow<()>,
{
    let deadline = Instant::now() + limits.timeout;
    let mut queue: VecDeque<(PathBuf, usize)> =
        roots.iter().map(|r| (r.clone(), 0)).collect();

    while let Some((dir, depth)) = queue.pop_front() {
        if Instant::now() >= deadline {
            return true;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            if file_type.is_dir() {
                if depth + 1 < limits.max_depth {
                    queue.push_back((path, depth + 1));
                }
            } else if visit(&path, &file_type).is_break() {
                return false;
            }
        }
    }
    false
}

/// First entry under `roots` accepted by `predicate`.
#[must_use]
pub fn find_first<P>(roots: &[PathBuf], limits: SearchLimits, predicate: P) -> Option<PathBuf>
where
    P: Fn(&Path, &FileType) -> bool,
{
    let mut found = None;
    walk(roots, limits, |path, file_type| {
        if predicate(path, file_type) {
            found = Some(path.to_path_buf());
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    found
}

/// Every entry under `roots` accepted by `predicate`.
#[must_use]
pub fn find_all<P>(roots: &[PathBuf], limits: SearchLimits, predicate: P) -> Vec<PathBuf>
where
    P: Fn(&Path, &FileType) -> bool,
{
    let mut found = Vec::new();
    walk(roots, limits, |path, file_type| {
        if predicate(path, file_type) {
            found.push(path.to_path_buf());
        }
        ControlFlow::Continue(())
    });
    found
}

/// First executable file named `name` under `roots`.
#[must_use]
pub fn find_executable(roots: &[PathBuf], limits: SearchLimits, name: &str) -> Option<PathBuf> {
    find_first(roots, limits, |path, _| {
        path.file_name().is_some_and(|n| n == name) && super::fs::is_executable(path)
    })
}
