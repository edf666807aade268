//! Installer and uninstaller for the Soundness CLI.
//!
//! Installs the helper binary, puts its directory on `PATH` through the
//! user's shell profile, bootstraps the compiler toolchain, builds the CLI
//! and generates a fresh key pair. Uninstall reverses the footprint.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: optional TOML settings and the paths derived from them
//! - **[`resources`]**: idempotent `check + apply` primitives (profile lines, downloads, key files)
//! - **[`tasks`]**: named steps run in a fixed order with per-step outcomes
//! - **[`commands`]**: top-level orchestration (`install`, `uninstall`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod environment;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod prompt;
pub mod resources;
pub mod shell;
pub mod tasks;
