//! Command-line parsing: the single mode argument and shared options.
use std::str::FromStr;

use clap::Parser;

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "soundness-installer",
    about = "Install or uninstall the Soundness CLI, its toolchain and key pair",
    version
)]
pub struct Cli {
    /// What to do: 1|install, 2|uninstall, h|help (prompts when omitted)
    pub mode: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every mode.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared by install and uninstall.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Settings file (default: $XDG_CONFIG_HOME/soundness/installer.toml)
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,
}

/// Operating mode selected by the single positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Run the install sequence.
    Install,
    /// Run the uninstall sequence.
    Uninstall,
    /// Print usage.
    Help,
}

impl Mode {
    /// Command name used for the log file.
    #[must_use]
    pub const fn command_name(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
            Self::Help => "help",
        }
    }
}

/// Error for an unrecognised mode argument.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid argument '{0}'")]
pub struct InvalidMode(pub String);

impl FromStr for Mode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" | "install" => Ok(Self::Install),
            "2" | "uninstall" => Ok(Self::Uninstall),
            "h" | "help" => Ok(Self::Help),
            other => Err(InvalidMode(other.to_string())),
        }
    }
}

/// Usage text shown for `help` and after an invalid argument.
pub const USAGE: &str = "\
Usage: soundness-installer [MODE] [--verbose] [--config <FILE>]

Modes:
  1, install      Install the Soundness CLI, its toolchain and a fresh key pair
  2, uninstall    Remove the Soundness CLI, its keys and PATH entries
  h, help         Show this message

Run without a mode to choose interactively.

Environment:
  SOUNDNESS_DIR   Base directory for the tool (default: ~/.soundness)
  ZDOTDIR         zsh dotfile directory (default: ~)";
