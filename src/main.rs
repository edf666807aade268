//! `soundness-installer` entry point.
use std::io;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Parser;

use soundness_installer::cli::{self, Mode, USAGE};
use soundness_installer::{commands, logging, prompt};

#[allow(clippy::print_stdout, clippy::print_stderr)]
fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    let mode = match args.mode.as_deref() {
        Some(word) => match word.parse::<Mode>() {
            Ok(mode) => mode,
            Err(e) => {
                eprintln!("error: {e}\n\n{USAGE}");
                std::process::exit(1);
            }
        },
        None => match prompt::select_mode(io::stdin().lock())? {
            Some(mode) => mode,
            None => bail!("invalid selection; choose 1 (install) or 2 (uninstall)"),
        },
    };

    if mode == Mode::Help {
        println!("{USAGE}");
        return Ok(());
    }

    logging::init_subscriber(args.verbose, mode.command_name());
    let log = Arc::new(logging::Logger::new(mode.command_name()));

    match mode {
        Mode::Install => commands::install::run(&args.global, &log),
        Mode::Uninstall => commands::uninstall::run(&args.global, &log),
        Mode::Help => Ok(()),
    }
}
