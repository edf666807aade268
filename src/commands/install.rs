//! Install command implementation.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::environment::Environment;
use crate::logging::Logger;
use crate::tasks::{self, Context};

/// Run the install command.
///
/// # Errors
///
/// Returns an error if setup fails or any fatal step fails.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    setup.show_logo();
    let super::CommandSetup { ctx, mut env } = setup;
    let result = execute(&ctx, &mut env, log);
    if result.is_ok() {
        log.info("Soundness CLI installed; open a new shell to pick up the PATH change");
    }
    result
}

/// Run the install sequence against an explicit context and environment.
///
/// # Errors
///
/// Returns the error of the fatal step that stopped the sequence.
pub fn execute(ctx: &Context, env: &mut Environment, log: &Logger) -> Result<()> {
    let tasks = tasks::all_install_tasks();
    super::run_to_summary(&tasks, ctx, env, log)
}
