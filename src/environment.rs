//! The run's view of the user environment.
//!
//! Captured once at start-up and threaded through every step as an explicit
//! value. Steps that extend `PATH`, resolve the shell profile, or locate the
//! CLI record the result here; child processes receive `PATH` from this value.
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::shell::Profile;

/// Snapshot of the environment plus the facts established by earlier steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// User's home directory (`$HOME`).
    pub home: PathBuf,
    /// Login shell path (`$SHELL`), if set.
    pub shell: Option<String>,
    /// zsh dotfile directory override (`$ZDOTDIR`), if set.
    pub zdotdir: Option<PathBuf>,
    /// Effective `PATH` for child processes.
    pub path: String,
    /// Tool directory override (`$SOUNDNESS_DIR`), if set.
    pub tool_dir: Option<PathBuf>,
    /// Profile chosen by the resolve step.
    pub profile: Option<Profile>,
    /// CLI binary found by the locate step.
    pub cli_binary: Option<PathBuf>,
}

impl Environment {
    /// Capture the environment of the current process.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is not set.
    pub fn capture() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build an environment from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let home = get("HOME")
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingVar("HOME"))?;
        Ok(Self {
            home,
            shell: get("SHELL"),
            zdotdir: get("ZDOTDIR").map(PathBuf::from),
            path: get("PATH").unwrap_or_default(),
            tool_dir: get("SOUNDNESS_DIR").map(PathBuf::from),
            profile: None,
            cli_binary: None,
        })
    }

    /// Whether `dir` is one of the colon-delimited `PATH` entries.
    #[must_use]
    pub fn path_contains(&self, dir: &Path) -> bool {
        path_list_contains(&self.path, dir)
    }

    /// Append `dir` to `PATH` unless it is already present.
    ///
    /// Returns `true` if `PATH` changed.
    pub fn append_path(&mut self, dir: &Path) -> bool {
        if self.path_contains(dir) {
            return false;
        }
        let entry = dir.display().to_string();
        if self.path.is_empty() {
            self.path = entry;
        } else {
            self.path = format!("{}:{entry}", self.path);
        }
        true
    }

    /// Prepend `dir` to `PATH` unless it is already present.
    ///
    /// Returns `true` if `PATH` changed.
    pub fn prepend_path(&mut self, dir: &Path) -> bool {
        if self.path_contains(dir) {
            return false;
        }
        let entry = dir.display().to_string();
        if self.path.is_empty() {
            self.path = entry;
        } else {
            self.path = format!("{entry}:{}", self.path);
        }
        true
    }

    /// Environment overrides to pass to child processes.
    #[must_use]
    pub fn child_env(&self) -> Vec<(&str, &str)> {
        vec![("PATH", self.path.as_str())]
    }
}

/// Whether `dir` appears as a whole entry in a colon-separated path list.
///
/// A trailing slash on either side is ignored.
#[must_use]
pub fn path_list_contains(list: &str, dir: &Path) -> bool {
    let wanted = dir.display().to_string();
    let wanted = wanted.trim_end_matches('/');
    list.split(':')
        .filter(|e| !e.is_empty())
        .any(|entry| entry.trim_end_matches('/') == wanted)
}
