//! Uninstall steps that stop running processes and remove directories.
use anyhow::{Result, bail};

use super::{Context, FailurePolicy, Task, TaskResult};
use crate::environment::Environment;
use crate::resources::fs::{Removal, remove_path};
use crate::resources::process::{list_processes, protected_pids, select_targets, terminate};

/// Send `SIGTERM` once to every process mentioning the product.
#[derive(Debug)]
pub struct StopProcesses;

impl Task for StopProcesses {
    fn name(&self) -> &'static str {
        "Stop running processes"
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::BestEffort
    }

    fn run(&self, ctx: &Context, _env: &mut Environment) -> Result<TaskResult> {
        let Some(processes) = list_processes(&ctx.proc_root) else {
            return Ok(TaskResult::Skipped(format!(
                "{} is not available",
                ctx.proc_root.display()
            )));
        };
        let targets = select_targets(&processes, &ctx.settings.product, &protected_pids());
        if targets.is_empty() {
            return Ok(TaskResult::Skipped("no matching processes".to_string()));
        }

        let mut signalled = 0usize;
        for process in &targets {
            match terminate(process.pid) {
                Ok(()) => {
                    ctx.log
                        .debug(&format!("SIGTERM {} ({})", process.pid, process.cmdline));
                    signalled += 1;
                }
                Err(e) => ctx.log.debug(&format!("{e:#}")),
            }
        }
        if signalled == 0 {
            return Ok(TaskResult::Skipped(
                "matching processes already exited".to_string(),
            ));
        }

        ctx.log.info(&format!("signalled {signalled} process(es)"));
        std::thread::sleep(ctx.settings.uninstall.grace_period());
        Ok(TaskResult::Ok)
    }
}

/// Remove the tool directory and the product's data directories.
#[derive(Debug)]
pub struct RemoveDirs;

impl Task for RemoveDirs {
    fn name(&self) -> &'static str {
        "Remove directories"
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::BestEffort
    }

    fn run(&self, ctx: &Context, _env: &mut Environment) -> Result<TaskResult> {
        let mut removed = 0usize;
        let mut failed = Vec::new();
        for dir in ctx.paths.removable_dirs(&ctx.settings) {
            match remove_path(&dir) {
                Ok(Removal::Removed) => {
                    ctx.log.info(&format!("removed {}", dir.display()));
                    removed += 1;
                }
                Ok(Removal::Absent) => {
                    ctx.log.debug(&format!("{} not present", dir.display()));
                }
                Err(e) => failed.push(format!("{e:#}")),
            }
        }
        if !failed.is_empty() {
            bail!(failed.join("; "));
        }
        Ok(if removed == 0 {
            TaskResult::Skipped("no directories to remove".to_string())
        } else {
            TaskResult::Ok
        })
    }
}
