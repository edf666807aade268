//! Domain-specific error types for the installer.
//!
//! Internal modules return typed errors for the fatal, user-actionable cases
//! while step and command code attaches context with [`anyhow`]. Every fatal
//! variant renders a remediation the user can act on.
//!
//! # Error types
//!
//! ```text
//! ShellError      # profile resolution
//! FetchError      # downloads
//! DiscoveryError  # locating helper / CLI binaries
//! PrivilegeError  # build tools that need root
//! ConfigError     # settings file and environment
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the shell profile resolver.
#[derive(Error, Debug)]
pub enum ShellError {
    /// `$SHELL` does not name a supported shell.
    #[error(
        "unsupported shell '{shell}'; add {bin_dir} to your PATH manually and re-run the installer"
    )]
    Unsupported {
        /// Raw value of `$SHELL` (empty when unset).
        shell: String,
        /// Directory the user must add to PATH.
        bin_dir: PathBuf,
    },
}

/// Errors from downloading remote artifacts.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be completed or returned an error status.
    #[error("failed to download {url}: {reason}; check your network connection and re-run")]
    Request {
        /// URL that was requested.
        url: String,
        /// Transport or status message.
        reason: String,
    },

    /// The response body could not be written to disk.
    #[error("failed to write download to {path}: {source}")]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors from locating binaries after the fallback chain is exhausted.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The binary was not found in any candidate location.
    #[error(
        "could not find '{name}' (searched: {searched}); re-run the installer or install it manually"
    )]
    NotFound {
        /// Binary name.
        name: String,
        /// Human-readable list of locations that were tried.
        searched: String,
    },
}

/// Errors caused by missing privileges.
#[derive(Error, Debug)]
pub enum PrivilegeError {
    /// Installing build tools requires root.
    #[error(
        "installing build tools requires root; run:\n\n    {command}\n\nthen re-run the installer"
    )]
    Required {
        /// Exact command the user should run.
        command: String,
    },

    /// No supported package manager was found.
    #[error(
        "missing build tools ({missing}) and no supported package manager was found; install them manually and re-run"
    )]
    NoPackageManager {
        /// Comma-separated list of missing tools.
        missing: String,
    },
}

/// Errors from loading the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read settings file {path}: {source}")]
    Io {
        /// Path of the settings file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or has unexpected fields.
    #[error("invalid settings file {path}: {message}")]
    Parse {
        /// Path of the settings file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A required environment variable is unset.
    #[error("{0} environment variable is not set")]
    MissingVar(&'static str),
}
