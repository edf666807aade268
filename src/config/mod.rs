//! Installer settings and the paths derived from them.
//!
//! Settings come from an optional TOML file; every field has a default so a
//! missing file (the common case) yields a fully working configuration.
pub mod paths;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::environment::Environment;
use crate::error::ConfigError;

pub use paths::{InstallPaths, KeyLocations};

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Product name; profile lines and processes containing it are removed on uninstall.
    pub product: String,
    /// Optional decorative banner script piped to `sh` at start-up.
    pub logo_url: Option<String>,
    /// Helper binary settings.
    pub helper: HelperSettings,
    /// CLI settings.
    pub cli: CliSettings,
    /// Toolchain settings.
    pub toolchain: ToolchainSettings,
    /// Key pair settings.
    pub keys: KeySettings,
    /// Uninstall behaviour.
    pub uninstall: UninstallSettings,
    /// Bounded filesystem search limits.
    pub search: SearchSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            product: "soundness".to_string(),
            logo_url: None,
            helper: HelperSettings::default(),
            cli: CliSettings::default(),
            toolchain: ToolchainSettings::default(),
            keys: KeySettings::default(),
            uninstall: UninstallSettings::default(),
            search: SearchSettings::default(),
        }
    }
}

/// The fetched helper that installs the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HelperSettings {
    /// Download URL.
    pub url: String,
    /// File name under the tool's `bin/` directory.
    pub name: String,
}

impl Default for HelperSettings {
    fn default() -> Self {
        Self {
            url: "https://raw.githubusercontent.com/soundnesslabs/soundness-layer/main/soundnessup/soundnessup"
                .to_string(),
            name: "soundnessup".to_string(),
        }
    }
}

/// The CLI produced by the helper.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliSettings {
    /// Binary name.
    pub name: String,
    /// Package name for `cargo uninstall`.
    pub package: String,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            name: "soundness-cli".to_string(),
            package: "soundness-cli".to_string(),
        }
    }
}

/// The compiler toolchain and its installer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainSettings {
    /// Installer script piped to `sh -s -- -y`.
    pub installer_url: String,
    /// Program whose presence on PATH means the toolchain is installed.
    pub compiler: String,
    /// Toolchain manager offered for removal on uninstall.
    pub manager: String,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        Self {
            installer_url: "https://sh.rustup.rs".to_string(),
            compiler: "cargo".to_string(),
            manager: "rustup".to_string(),
        }
    }
}

/// Key pair naming and locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeySettings {
    /// Name passed to `generate-key --name`.
    pub name: String,
    /// Directories searched for key files; empty means the built-in list.
    /// Relative entries are resolved against the home directory.
    pub directories: Vec<PathBuf>,
}

impl Default for KeySettings {
    fn default() -> Self {
        Self {
            name: "my-key".to_string(),
            directories: Vec::new(),
        }
    }
}

/// Uninstall behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UninstallSettings {
    /// Seconds to wait for the toolchain-removal answer.
    pub prompt_timeout_secs: u64,
    /// Seconds to wait after signalling running processes.
    pub grace_period_secs: u64,
    /// Additional directories to remove, relative to home unless absolute.
    pub extra_dirs: Vec<PathBuf>,
}

impl Default for UninstallSettings {
    fn default() -> Self {
        Self {
            prompt_timeout_secs: 30,
            grace_period_secs: 2,
            extra_dirs: vec![PathBuf::from(".local/share/soundness")],
        }
    }
}

impl UninstallSettings {
    /// Prompt timeout as a [`Duration`].
    #[must_use]
    pub const fn prompt_timeout(&self) -> Duration {
        Duration::from_secs(self.prompt_timeout_secs)
    }

    /// Grace period as a [`Duration`].
    #[must_use]
    pub const fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}

/// Limits for filesystem-search fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchSettings {
    /// Maximum directory depth below each root.
    pub max_depth: usize,
    /// Wall-clock budget per search, in seconds.
    pub timeout_secs: u64,
    /// Extra roots searched for the CLI after home; defaults to `/usr/local` and `/opt`.
    pub roots: Option<Vec<PathBuf>>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_depth: 6,
            timeout_secs: 15,
            roots: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or return defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse settings from TOML text; `origin` is used in error messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid settings TOML.
    pub fn parse(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.message().to_string(),
        })
    }
}

/// Default settings file: `${XDG_CONFIG_HOME:-~/.config}/soundness/installer.toml`.
#[must_use]
pub fn default_settings_path(env: &Environment) -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map_or_else(|| env.home.join(".config"), PathBuf::from)
        .join("soundness")
        .join("installer.toml")
}
