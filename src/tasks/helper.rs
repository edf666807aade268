//! Steps that place the helper binary and use it to install the CLI.
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult};
use crate::environment::Environment;
use crate::error::DiscoveryError;
use crate::exec::path_arg;
use crate::resources::download::install_binary;
use crate::resources::fs::{DirectoryResource, is_executable};
use crate::resources::search::find_executable;
use crate::resources::{Resource as _, ResourceChange};

/// Create the tool's `bin` directory.
#[derive(Debug)]
pub struct EnsureDirs;

impl Task for EnsureDirs {
    fn name(&self) -> &'static str {
        "Create tool directories"
    }

    fn run(&self, ctx: &Context, _env: &mut Environment) -> Result<TaskResult> {
        let dir = DirectoryResource::new(ctx.paths.bin_dir.clone());
        Ok(match dir.ensure()? {
            ResourceChange::Applied => {
                ctx.log.info(&format!("created {}", ctx.paths.bin_dir.display()));
                TaskResult::Ok
            }
            ResourceChange::AlreadyCorrect => {
                ctx.log.debug(&format!("{} exists", ctx.paths.bin_dir.display()));
                TaskResult::Ok
            }
        })
    }
}

/// Download the helper binary into the tool's `bin` directory.
#[derive(Debug)]
pub struct FetchToolBinary;

impl Task for FetchToolBinary {
    fn name(&self) -> &'static str {
        "Download helper binary"
    }

    fn run(&self, ctx: &Context, _env: &mut Environment) -> Result<TaskResult> {
        let url = &ctx.settings.helper.url;
        let dest = &ctx.paths.helper_binary;
        ctx.log.debug(&format!("GET {url}"));
        install_binary(ctx.fetcher.as_ref(), url, dest)?;
        ctx.log.info(&format!("installed {}", dest.display()));
        Ok(TaskResult::Ok)
    }
}

/// Where the helper binary was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelperSource {
    /// At the path the download step wrote.
    KnownPath(PathBuf),
    /// Resolved through `PATH`.
    OnPath(PathBuf),
    /// Found by the bounded search under home.
    Search(PathBuf),
}

impl HelperSource {
    /// The helper's location.
    #[must_use]
    pub const fn path(&self) -> &PathBuf {
        match self {
            Self::KnownPath(p) | Self::OnPath(p) | Self::Search(p) => p,
        }
    }
}

/// Find the helper: known path, then `PATH`, then a bounded search of home.
///
/// # Errors
///
/// Returns [`DiscoveryError::NotFound`] when every fallback misses.
pub fn locate_helper(ctx: &Context, env: &Environment) -> Result<HelperSource, DiscoveryError> {
    let name = &ctx.settings.helper.name;
    if is_executable(&ctx.paths.helper_binary) {
        return Ok(HelperSource::KnownPath(ctx.paths.helper_binary.clone()));
    }
    if let Some(found) = ctx.executor.which_in(name, &env.path) {
        return Ok(HelperSource::OnPath(found));
    }
    ctx.log
        .debug(&format!("searching {} for {name}", env.home.display()));
    find_executable(
        std::slice::from_ref(&env.home),
        ctx.search_limits(),
        name,
    )
    .map(HelperSource::Search)
    .ok_or_else(|| DiscoveryError::NotFound {
        name: name.clone(),
        searched: format!(
            "{}, PATH, {}",
            ctx.paths.helper_binary.display(),
            env.home.display()
        ),
    })
}

/// Run the helper's `install` subcommand.
#[derive(Debug)]
pub struct InstallCli;

impl Task for InstallCli {
    fn name(&self) -> &'static str {
        "Install Soundness CLI"
    }

    fn run(&self, ctx: &Context, env: &mut Environment) -> Result<TaskResult> {
        let source = locate_helper(ctx, env)?;
        ctx.log.debug(&format!("helper: {source:?}"));
        let helper = path_arg(source.path())?;
        ctx.executor
            .run(helper, &["install"], &env.child_env())
            .with_context(|| format!("{helper} install"))?;
        ctx.log.info(&format!("installed {}", ctx.settings.cli.name));
        Ok(TaskResult::Ok)
    }
}
