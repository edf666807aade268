//! Locating and removing the installed CLI binary.
use std::path::PathBuf;

use anyhow::Result;

use super::{Context, FailurePolicy, Task, TaskResult};
use crate::environment::Environment;
use crate::error::DiscoveryError;
use crate::resources::fs::{Removal, is_executable, remove_path};
use crate::resources::search::find_executable;

/// Find the CLI: conventional locations first, then a bounded search.
///
/// # Errors
///
/// Returns [`DiscoveryError::NotFound`] when nothing matches.
pub fn locate_cli(ctx: &Context) -> Result<PathBuf, DiscoveryError> {
    let name = &ctx.settings.cli.name;
    let candidates = ctx.paths.cli_candidates(name);
    if let Some(found) = candidates.iter().find(|p| is_executable(p)) {
        return Ok(found.clone());
    }
    let roots = ctx.paths.cli_search_roots(&ctx.settings);
    ctx.log.debug(&format!(
        "{name} not in a standard location; searching {}",
        display_list(&roots)
    ));
    find_executable(&roots, ctx.search_limits(), name).ok_or_else(|| {
        DiscoveryError::NotFound {
            name: name.clone(),
            searched: display_list(candidates.iter().chain(roots.iter())),
        }
    })
}

fn display_list<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) -> String {
    paths
        .into_iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Record where the freshly installed CLI lives.
#[derive(Debug)]
pub struct LocateCliBinary;

impl Task for LocateCliBinary {
    fn name(&self) -> &'static str {
        "Locate CLI binary"
    }

    fn run(&self, ctx: &Context, env: &mut Environment) -> Result<TaskResult> {
        let found = locate_cli(ctx)?;
        ctx.log.info(&format!("found {}", found.display()));
        env.cli_binary = Some(found);
        Ok(TaskResult::Ok)
    }
}

/// Delete the helper and every conventional copy of the CLI.
#[derive(Debug)]
pub struct RemoveBinaries;

impl Task for RemoveBinaries {
    fn name(&self) -> &'static str {
        "Remove binaries"
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::BestEffort
    }

    fn run(&self, ctx: &Context, _env: &mut Environment) -> Result<TaskResult> {
        let mut removed = 0;
        let mut failures = Vec::new();
        for bin in ctx.paths.removable_binaries(&ctx.settings.cli.name) {
            match remove_path(&bin) {
                Ok(Removal::Removed) => {
                    ctx.log.info(&format!("removed {}", bin.display()));
                    removed += 1;
                }
                Ok(Removal::Absent) => {}
                Err(e) => {
                    ctx.log.warn(&format!("{e:#}"));
                    failures.push(bin.display().to_string());
                }
            }
        }
        if !failures.is_empty() {
            anyhow::bail!("could not remove {}", failures.join(", "));
        }
        Ok(if removed == 0 {
            TaskResult::Skipped("no binaries found".to_string())
        } else {
            TaskResult::Ok
        })
    }
}
