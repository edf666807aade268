//! Build tools and the Rust toolchain.
use anyhow::{Context as _, Result};

use super::{Context, FailurePolicy, Task, TaskResult};
use crate::environment::Environment;
use crate::error::PrivilegeError;
use crate::exec::path_arg;
use crate::prompt::Confirmation;
use crate::resources::fs::is_executable;

/// Tools the CLI build needs on `PATH`.
pub const BUILD_TOOLS: [&str; 4] = ["cc", "make", "pkg-config", "git"];

/// Install compilers and headers through the system package manager.
#[derive(Debug)]
pub struct EnsureBuildTools;

impl Task for EnsureBuildTools {
    fn name(&self) -> &'static str {
        "Install build tools"
    }

    fn run(&self, ctx: &Context, env: &mut Environment) -> Result<TaskResult> {
        let missing: Vec<&str> = BUILD_TOOLS
            .into_iter()
            .filter(|tool| ctx.executor.which_in(tool, &env.path).is_none())
            .collect();
        if missing.is_empty() {
            return Ok(TaskResult::Skipped("build tools already installed".to_string()));
        }
        ctx.log
            .info(&format!("missing build tools: {}", missing.join(", ")));

        let Some(pm) = ctx.platform.package_manager else {
            return Err(PrivilegeError::NoPackageManager {
                missing: missing.join(", "),
            }
            .into());
        };
        if pm.needs_root() && !ctx.platform.is_root {
            return Err(PrivilegeError::Required {
                command: pm.remediation(),
            }
            .into());
        }

        for command in pm.build_tools_commands() {
            let Some((program, args)) = command.split_first() else {
                continue;
            };
            ctx.log.debug(&format!("running {}", command.join(" ")));
            ctx.executor
                .run(program, args, &env.child_env())
                .with_context(|| format!("installing build tools with {pm}"))?;
        }
        Ok(TaskResult::Ok)
    }
}

/// Install the Rust toolchain unless the compiler is already reachable.
#[derive(Debug)]
pub struct EnsureToolchain;

impl Task for EnsureToolchain {
    fn name(&self) -> &'static str {
        "Install Rust toolchain"
    }

    fn run(&self, ctx: &Context, env: &mut Environment) -> Result<TaskResult> {
        let toolchain = &ctx.settings.toolchain;
        if let Some(found) = ctx.executor.which_in(&toolchain.compiler, &env.path) {
            return Ok(TaskResult::Skipped(format!(
                "{} found at {}",
                toolchain.compiler,
                found.display()
            )));
        }

        let cargo_bin = env.home.join(".cargo").join("bin");
        if is_executable(&cargo_bin.join(&toolchain.compiler)) {
            env.prepend_path(&cargo_bin);
            return Ok(TaskResult::Skipped(format!(
                "{} already installed in {}",
                toolchain.compiler,
                cargo_bin.display()
            )));
        }

        ctx.log
            .debug(&format!("GET {}", toolchain.installer_url));
        let script = ctx.fetcher.fetch_text(&toolchain.installer_url)?;
        ctx.executor
            .run_with_stdin("sh", &["-s", "--", "-y"], &script, &env.child_env())
            .context("running the toolchain installer")?;
        env.prepend_path(&cargo_bin);
        ctx.log
            .info(&format!("installed toolchain into {}", cargo_bin.display()));
        Ok(TaskResult::Ok)
    }
}

/// Remove the CLI through `cargo uninstall`.
#[derive(Debug)]
pub struct RemoveViaPackageManager;

impl Task for RemoveViaPackageManager {
    fn name(&self) -> &'static str {
        "Uninstall CLI package"
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::BestEffort
    }

    fn run(&self, ctx: &Context, env: &mut Environment) -> Result<TaskResult> {
        let compiler = &ctx.settings.toolchain.compiler;
        let Some(cargo) = ctx.executor.which_in(compiler, &env.path) else {
            return Ok(TaskResult::Skipped(format!("{compiler} not found on PATH")));
        };
        let package = &ctx.settings.cli.package;
        let result = ctx.executor.run_unchecked(
            path_arg(&cargo)?,
            &["uninstall", package],
            &env.child_env(),
        )?;
        if result.success {
            ctx.log.info(&format!("uninstalled {package}"));
            Ok(TaskResult::Ok)
        } else {
            Ok(TaskResult::Skipped(format!(
                "{package} is not installed through {compiler}"
            )))
        }
    }
}

/// Offer to remove the whole Rust toolchain.
#[derive(Debug)]
pub struct OptionallyRemoveToolchain;

impl Task for OptionallyRemoveToolchain {
    fn name(&self) -> &'static str {
        "Remove Rust toolchain"
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::BestEffort
    }

    fn run(&self, ctx: &Context, env: &mut Environment) -> Result<TaskResult> {
        let manager = &ctx.settings.toolchain.manager;
        let Some(rustup) = ctx.executor.which_in(manager, &env.path) else {
            return Ok(TaskResult::Skipped(format!("{manager} not found on PATH")));
        };
        let timeout = ctx.settings.uninstall.prompt_timeout();
        match ctx
            .prompter
            .confirm(&format!("Remove the Rust toolchain ({manager})?"), timeout)
        {
            Confirmation::Yes => {
                ctx.executor
                    .run(
                        path_arg(&rustup)?,
                        &["self", "uninstall", "-y"],
                        &env.child_env(),
                    )
                    .context("removing the Rust toolchain")?;
                ctx.log.info("removed the Rust toolchain");
                Ok(TaskResult::Ok)
            }
            Confirmation::No => Ok(TaskResult::Skipped("toolchain kept".to_string())),
            Confirmation::TimedOut => Ok(TaskResult::Skipped(format!(
                "no answer within {}s; toolchain kept",
                timeout.as_secs()
            ))),
        }
    }
}
