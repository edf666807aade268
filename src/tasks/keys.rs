//! Key pair steps.
use anyhow::{Result, bail};

use super::cli::locate_cli;
use super::{Context, FailurePolicy, Task, TaskResult};
use crate::environment::Environment;
use crate::exec::path_arg;
use crate::resources::keys::{Purge, purge_all, purge_named, sweep_named};

fn summarize(ctx: &Context, purge: &Purge, nothing: &str) -> Result<TaskResult> {
    for path in &purge.removed {
        ctx.log.debug(&format!("removed {}", path.display()));
    }
    if !purge.failed.is_empty() {
        let list = purge
            .failed
            .iter()
            .map(|(path, reason)| format!("{} ({reason})", path.display()))
            .collect::<Vec<_>>()
            .join(", ");
        bail!("could not remove {list}");
    }
    Ok(if purge.removed.is_empty() {
        TaskResult::Skipped(nothing.to_string())
    } else {
        ctx.log
            .info(&format!("removed {} key file(s)", purge.removed.len()));
        TaskResult::Ok
    })
}

/// Delete key files left by a previous install before generating new ones.
#[derive(Debug)]
pub struct PurgeOldKeys;

impl Task for PurgeOldKeys {
    fn name(&self) -> &'static str {
        "Remove old keys"
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::BestEffort
    }

    fn run(&self, ctx: &Context, env: &mut Environment) -> Result<TaskResult> {
        let name = &ctx.settings.keys.name;
        let mut purge = purge_named(&ctx.key_locations, name);
        sweep_named(
            &mut purge,
            std::slice::from_ref(&env.home),
            name,
            ctx.search_limits(),
        );
        summarize(ctx, &purge, "no old keys found")
    }
}

/// Have the CLI generate a fresh key pair.
///
/// The CLI talks to the terminal directly: its output, including the
/// recovery phrase, is never captured or logged.
#[derive(Debug)]
pub struct GenerateKey;

impl Task for GenerateKey {
    fn name(&self) -> &'static str {
        "Generate key pair"
    }

    fn run(&self, ctx: &Context, env: &mut Environment) -> Result<TaskResult> {
        let cli = match &env.cli_binary {
            Some(path) => path.clone(),
            None => locate_cli(ctx)?,
        };
        let name = &ctx.settings.keys.name;
        ctx.log.info(&format!(
            "generating key '{name}'; write down the recovery phrase shown below"
        ));
        let code = ctx.executor.run_interactive(
            path_arg(&cli)?,
            &["generate-key", "--name", name],
            &env.child_env(),
        )?;
        if code != 0 {
            bail!("{} generate-key exited with status {code}", cli.display());
        }
        Ok(TaskResult::Ok)
    }
}

/// Delete every key file in the known key locations.
#[derive(Debug)]
pub struct RemoveKeys;

impl Task for RemoveKeys {
    fn name(&self) -> &'static str {
        "Remove keys"
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::BestEffort
    }

    fn run(&self, ctx: &Context, _env: &mut Environment) -> Result<TaskResult> {
        let purge = purge_all(
            &ctx.key_locations,
            &ctx.settings.keys.name,
            ctx.search_limits(),
        );
        summarize(ctx, &purge, "no key files found")
    }
}
