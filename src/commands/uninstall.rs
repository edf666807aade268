//! Uninstall command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::environment::Environment;
use crate::logging::Logger;
use crate::tasks::{self, Context};

/// Run the uninstall command.
///
/// Every step is best-effort, so once setup succeeds the command always
/// completes.
///
/// # Errors
///
/// Returns an error only if setup fails.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    setup.show_logo();
    let super::CommandSetup { ctx, mut env } = setup;
    execute(&ctx, &mut env, log);
    log.info("Soundness CLI removed; open a new shell to drop it from PATH");
    Ok(())
}

/// Run the uninstall sequence against an explicit context and environment.
pub fn execute(ctx: &Context, env: &mut Environment, log: &Logger) {
    let tasks = tasks::all_uninstall_tasks();
    if let Err(e) = super::run_to_summary(&tasks, ctx, env, log) {
        log.warn(&format!("{e:#}"));
    }
}
