//! Shell profile resolver.
//!
//! Maps the login shell to the startup file that controls `PATH` for future
//! interactive sessions. Pure: reads nothing but its arguments.
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ShellError;

/// Shells the installer knows how to configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    /// GNU bash.
    Bash,
    /// Z shell.
    Zsh,
    /// fish.
    Fish,
    /// Almquist-family shells (ash, dash, busybox sh).
    Ash,
    /// Anything else.
    Unknown,
}

impl ShellKind {
    /// Classify a shell path by suffix.
    ///
    /// Order matters: `bash` must be tested before `ash`.
    #[must_use]
    pub fn from_shell_path(shell: &str) -> Self {
        let shell = shell.trim_end_matches('/');
        if shell.ends_with("zsh") {
            Self::Zsh
        } else if shell.ends_with("bash") {
            Self::Bash
        } else if shell.ends_with("fish") {
            Self::Fish
        } else if shell.ends_with("ash") {
            Self::Ash
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bash => write!(f, "bash"),
            Self::Zsh => write!(f, "zsh"),
            Self::Fish => write!(f, "fish"),
            Self::Ash => write!(f, "ash"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A resolved profile file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Shell the profile belongs to.
    pub kind: ShellKind,
    /// Path of the startup file.
    pub path: PathBuf,
}

/// Resolve the profile for `shell`, or `None` for unsupported shells.
#[must_use]
pub fn resolve(shell: Option<&str>, home: &Path, zdotdir: Option<&Path>) -> Option<Profile> {
    let kind = ShellKind::from_shell_path(shell.unwrap_or_default());
    let path = match kind {
        ShellKind::Zsh => zdotdir.unwrap_or(home).join(".zshenv"),
        ShellKind::Bash => home.join(".bashrc"),
        ShellKind::Fish => home.join(".config").join("fish").join("config.fish"),
        ShellKind::Ash => home.join(".profile"),
        ShellKind::Unknown => return None,
    };
    Some(Profile { kind, path })
}

/// Resolve for install: an unsupported shell is fatal.
///
/// # Errors
///
/// Returns [`ShellError::Unsupported`] naming `bin_dir` so the user can edit
/// `PATH` by hand.
pub fn resolve_strict(
    shell: Option<&str>,
    home: &Path,
    zdotdir: Option<&Path>,
    bin_dir: &Path,
) -> Result<Profile, ShellError> {
    resolve(shell, home, zdotdir).ok_or_else(|| ShellError::Unsupported {
        shell: shell.unwrap_or_default().to_string(),
        bin_dir: bin_dir.to_path_buf(),
    })
}

/// Resolve for uninstall: an unsupported shell degrades to `~/.bashrc`.
///
/// The second element is `true` when the fallback was used.
#[must_use]
pub fn resolve_lenient(
    shell: Option<&str>,
    home: &Path,
    zdotdir: Option<&Path>,
) -> (Profile, bool) {
    resolve(shell, home, zdotdir).map_or_else(
        || {
            (
                Profile {
                    kind: ShellKind::Unknown,
                    path: home.join(".bashrc"),
                },
                true,
            )
        },
        |p| (p, false),
    )
}
