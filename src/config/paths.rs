//! Filesystem layout derived once per run from the environment and settings.
use std::path::{Path, PathBuf};

use super::Settings;
use crate::environment::Environment;

/// Where the installer puts things.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    /// User's home directory.
    pub home: PathBuf,
    /// Tool base directory (`$SOUNDNESS_DIR` or `<home>/.soundness`).
    pub tool_dir: PathBuf,
    /// `<tool_dir>/bin`, added to PATH.
    pub bin_dir: PathBuf,
    /// `<bin_dir>/<helper name>`.
    pub helper_binary: PathBuf,
}

impl InstallPaths {
    /// Derive the layout from the captured environment.
    #[must_use]
    pub fn resolve(env: &Environment, settings: &Settings) -> Self {
        let tool_dir = env
            .tool_dir
            .clone()
            .unwrap_or_else(|| env.home.join(".soundness"));
        let bin_dir = tool_dir.join("bin");
        let helper_binary = bin_dir.join(&settings.helper.name);
        Self {
            home: env.home.clone(),
            tool_dir,
            bin_dir,
            helper_binary,
        }
    }

    /// Conventional locations of the CLI binary, in lookup order.
    #[must_use]
    pub fn cli_candidates(&self, cli_name: &str) -> Vec<PathBuf> {
        vec![
            self.bin_dir.join(cli_name),
            self.home.join(".cargo").join("bin").join(cli_name),
            self.home.join(".local").join("bin").join(cli_name),
            PathBuf::from("/usr/local/bin").join(cli_name),
        ]
    }

    /// Roots for the CLI search fallback: home first, then the configured
    /// roots (default `/usr/local` and `/opt`).
    #[must_use]
    pub fn cli_search_roots(&self, settings: &Settings) -> Vec<PathBuf> {
        let mut roots = vec![self.home.clone()];
        match &settings.search.roots {
            Some(extra) => roots.extend(extra.iter().cloned()),
            None => roots.extend([PathBuf::from("/usr/local"), PathBuf::from("/opt")]),
        }
        roots
    }

    /// Directories removed on uninstall.
    #[must_use]
    pub fn removable_dirs(&self, settings: &Settings) -> Vec<PathBuf> {
        let mut dirs = vec![self.tool_dir.clone()];
        dirs.extend(
            settings
                .uninstall
                .extra_dirs
                .iter()
                .map(|d| under_home(&self.home, d)),
        );
        dirs
    }

    /// Binaries removed on uninstall.
    #[must_use]
    pub fn removable_binaries(&self, cli_name: &str) -> Vec<PathBuf> {
        let mut bins = vec![self.helper_binary.clone()];
        bins.extend(self.cli_candidates(cli_name));
        bins
    }
}

/// Ordered set of directories that may hold key files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLocations {
    dirs: Vec<PathBuf>,
}

impl KeyLocations {
    /// Build from settings, falling back to the built-in list.
    #[must_use]
    pub fn resolve(paths: &InstallPaths, settings: &Settings) -> Self {
        let dirs = if settings.keys.directories.is_empty() {
            vec![
                paths.tool_dir.join("keys"),
                paths.home.join(".soundness-cli").join("keys"),
                paths.home.join(".config").join("soundness").join("keys"),
                paths
                    .home
                    .join(".local")
                    .join("share")
                    .join("soundness")
                    .join("keys"),
            ]
        } else {
            settings
                .keys
                .directories
                .iter()
                .map(|d| under_home(&paths.home, d))
                .collect()
        };
        Self::new(dirs)
    }

    /// Build from an explicit list; duplicates are dropped, order kept.
    #[must_use]
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        let mut unique: Vec<PathBuf> = Vec::with_capacity(dirs.len());
        for d in dirs {
            if !unique.contains(&d) {
                unique.push(d);
            }
        }
        Self { dirs: unique }
    }

    /// All candidate directories, in order.
    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Candidate directories that currently exist.
    pub fn existing(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path).filter(|d| d.is_dir())
    }
}

fn under_home(home: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        home.join(p)
    }
}
