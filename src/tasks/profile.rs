//! Shell profile steps: resolve, add the PATH export, strip it again.
use anyhow::{Context as _, Result};

use super::{Context, FailurePolicy, Task, TaskResult};
use crate::environment::Environment;
use crate::resources::profile::{ProfileLineResource, StripResult, export_line, strip_profile};
use crate::resources::{Resource as _, ResourceChange};
use crate::shell::{self, Profile};

/// How an unsupported shell is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Strict,
    Lenient,
}

/// Pick the shell profile once and store it in the environment.
#[derive(Debug)]
pub struct ResolveProfile {
    resolution: Resolution,
}

impl ResolveProfile {
    /// Unsupported shells stop the run (install).
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            resolution: Resolution::Strict,
        }
    }

    /// Unsupported shells fall back to `~/.bashrc` (uninstall).
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            resolution: Resolution::Lenient,
        }
    }
}

impl Task for ResolveProfile {
    fn name(&self) -> &'static str {
        "Resolve shell profile"
    }

    fn policy(&self) -> FailurePolicy {
        match self.resolution {
            Resolution::Strict => FailurePolicy::Fatal,
            Resolution::Lenient => FailurePolicy::BestEffort,
        }
    }

    fn run(&self, ctx: &Context, env: &mut Environment) -> Result<TaskResult> {
        let shell = env.shell.as_deref();
        let profile = match self.resolution {
            Resolution::Strict => shell::resolve_strict(
                shell,
                &env.home,
                env.zdotdir.as_deref(),
                &ctx.paths.bin_dir,
            )?,
            Resolution::Lenient => {
                let (profile, degraded) =
                    shell::resolve_lenient(shell, &env.home, env.zdotdir.as_deref());
                if degraded {
                    ctx.log.warn(&format!(
                        "unrecognised shell '{}'; falling back to {}",
                        shell.unwrap_or_default(),
                        profile.path.display()
                    ));
                }
                profile
            }
        };
        ctx.log.info(&format!(
            "{} profile: {}",
            profile.kind,
            profile.path.display()
        ));
        env.profile = Some(profile);
        Ok(TaskResult::Ok)
    }
}

fn resolved_profile(env: &Environment) -> Result<&Profile> {
    env.profile
        .as_ref()
        .context("shell profile has not been resolved")
}

/// Make the tool's `bin` directory reachable now and in future shells.
#[derive(Debug)]
pub struct MutatePath;

impl Task for MutatePath {
    fn name(&self) -> &'static str {
        "Add bin directory to PATH"
    }

    fn run(&self, ctx: &Context, env: &mut Environment) -> Result<TaskResult> {
        let bin_dir = &ctx.paths.bin_dir;
        let profile = resolved_profile(env)?;
        let result = if env.path_contains(bin_dir) {
            ctx.log
                .debug(&format!("{} already on PATH", bin_dir.display()));
            TaskResult::Skipped(format!("{} already on PATH", bin_dir.display()))
        } else {
            let line = ProfileLineResource::new(profile.path.clone(), export_line(bin_dir));
            match line.ensure()? {
                ResourceChange::Applied => {
                    ctx.log
                        .info(&format!("added PATH export to {}", profile.path.display()));
                    TaskResult::Ok
                }
                ResourceChange::AlreadyCorrect => {
                    TaskResult::Skipped(format!("{} already exports PATH", profile.path.display()))
                }
            }
        };
        env.append_path(bin_dir);
        Ok(result)
    }
}

/// Remove every profile line mentioning the product.
#[derive(Debug)]
pub struct StripPathEntry;

impl Task for StripPathEntry {
    fn name(&self) -> &'static str {
        "Remove PATH entry from profile"
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::BestEffort
    }

    fn run(&self, ctx: &Context, env: &mut Environment) -> Result<TaskResult> {
        let profile = resolved_profile(env)?;
        match strip_profile(&profile.path, &ctx.settings.product)? {
            StripResult::Missing => Ok(TaskResult::Skipped(format!(
                "{} does not exist",
                profile.path.display()
            ))),
            StripResult::Unchanged => Ok(TaskResult::Skipped(format!(
                "no {} entries in {}",
                ctx.settings.product,
                profile.path.display()
            ))),
            StripResult::Rewritten { removed, strategy } => {
                ctx.log.info(&format!(
                    "removed {removed} line(s) from {}",
                    profile.path.display()
                ));
                ctx.log.debug(&format!("profile written via {strategy:?}"));
                Ok(TaskResult::Ok)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shell::ShellKind;
    use crate::tasks::test_helpers::{MockExecutor, make_context, test_env};
    use std::path::Path;
    use std::sync::Arc;

    fn setup(home: &Path, shell: &str) -> (Context, Environment) {
        let env = test_env(home, shell);
        let (ctx, _) = make_context(&env, Arc::new(MockExecutor::default()));
        (ctx, env)
    }

    #[test]
    fn strict_resolution_stores_profile() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, mut env) = setup(tmp.path(), "/usr/bin/zsh");
        ResolveProfile::strict().run(&ctx, &mut env).unwrap();
        let profile = env.profile.unwrap();
        assert_eq!(profile.kind, ShellKind::Zsh);
        assert_eq!(profile.path, tmp.path().join(".zshenv"));
    }

    #[test]
    fn strict_resolution_rejects_unknown_shell() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, mut env) = setup(tmp.path(), "/usr/bin/nu");
        let err = ResolveProfile::strict().run(&ctx, &mut env).unwrap_err();
        assert!(err.to_string().contains("add"));
        assert!(err.to_string().contains(".soundness/bin"));
        assert!(env.profile.is_none());
        assert_eq!(ResolveProfile::strict().policy(), FailurePolicy::Fatal);
    }

    #[test]
    fn lenient_resolution_falls_back_to_bashrc() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, mut env) = setup(tmp.path(), "/usr/bin/nu");
        ResolveProfile::lenient().run(&ctx, &mut env).unwrap();
        assert_eq!(env.profile.unwrap().path, tmp.path().join(".bashrc"));
    }

    #[test]
    fn mutate_path_twice_writes_one_line() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, mut env) = setup(tmp.path(), "/bin/bash");
        ResolveProfile::strict().run(&ctx, &mut env).unwrap();

        let mut second_env = env.clone();
        assert_eq!(MutatePath.run(&ctx, &mut env).unwrap(), TaskResult::Ok);
        assert!(env.path_contains(&ctx.paths.bin_dir));
        // A fresh run whose PATH does not yet include bin_dir.
        assert!(matches!(
            MutatePath.run(&ctx, &mut second_env).unwrap(),
            TaskResult::Skipped(_)
        ));

        let content = std::fs::read_to_string(tmp.path().join(".bashrc")).unwrap();
        assert_eq!(content.matches("export PATH=").count(), 1);
    }

    #[test]
    fn mutate_path_skips_profile_when_already_on_path() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, mut env) = setup(tmp.path(), "/bin/bash");
        ResolveProfile::strict().run(&ctx, &mut env).unwrap();
        env.append_path(&ctx.paths.bin_dir);
        assert!(matches!(
            MutatePath.run(&ctx, &mut env).unwrap(),
            TaskResult::Skipped(_)
        ));
        assert!(!tmp.path().join(".bashrc").exists());
    }

    #[test]
    fn mutate_path_requires_resolved_profile() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, mut env) = setup(tmp.path(), "/bin/bash");
        assert!(MutatePath.run(&ctx, &mut env).is_err());
    }

    #[test]
    fn strip_path_entry_removes_only_matching_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, mut env) = setup(tmp.path(), "/bin/bash");
        ResolveProfile::lenient().run(&ctx, &mut env).unwrap();
        let bashrc = tmp.path().join(".bashrc");
        std::fs::write(
            &bashrc,
            "alias ll='ls -l'\nexport PATH=\"$PATH:/h/.soundness/bin\"\nset -o vi\n",
        )
        .unwrap();

        assert_eq!(StripPathEntry.run(&ctx, &mut env).unwrap(), TaskResult::Ok);
        assert_eq!(
            std::fs::read_to_string(&bashrc).unwrap(),
            "alias ll='ls -l'\nset -o vi\n"
        );
    }

    #[test]
    fn strip_path_entry_skips_missing_profile() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, mut env) = setup(tmp.path(), "/bin/bash");
        ResolveProfile::lenient().run(&ctx, &mut env).unwrap();
        assert!(matches!(
            StripPathEntry.run(&ctx, &mut env).unwrap(),
            TaskResult::Skipped(_)
        ));
    }
}
