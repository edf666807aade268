//! Named install and uninstall steps run in a fixed order.
pub mod cleanup;
pub mod cli;
mod context;
pub mod helper;
pub mod keys;
pub mod profile;
pub mod toolchain;

pub use context::Context;

use std::any::TypeId;

use anyhow::Result;

use crate::environment::Environment;
use crate::logging::Outcome;

/// Result of a step that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// The step did its work.
    Ok,
    /// The step had nothing to do, with the reason.
    Skipped(String),
}

/// What a failing step means for the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the sequence.
    Fatal,
    /// Record the failure and continue.
    BestEffort,
}

/// A named, executable step.
pub trait Task: Send + Sync + 'static {
    /// Human-readable step name.
    fn name(&self) -> &str;

    /// The concrete `TypeId` of this step.
    fn task_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// Whether a failure stops the sequence.
    fn policy(&self) -> FailurePolicy {
        FailurePolicy::Fatal
    }

    /// Execute the step.
    ///
    /// # Errors
    ///
    /// Returns an error if the step fails; [`execute`] decides whether that
    /// stops the run.
    fn run(&self, ctx: &Context, env: &mut Environment) -> Result<TaskResult>;
}

/// The install sequence, in execution order.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(profile::ResolveProfile::strict()),
        Box::new(helper::EnsureDirs),
        Box::new(helper::FetchToolBinary),
        Box::new(profile::MutatePath),
        Box::new(toolchain::EnsureBuildTools),
        Box::new(toolchain::EnsureToolchain),
        Box::new(helper::InstallCli),
        Box::new(cli::LocateCliBinary),
        Box::new(keys::PurgeOldKeys),
        Box::new(keys::GenerateKey),
    ]
}

/// The uninstall sequence, in execution order. Every step is best-effort.
#[must_use]
pub fn all_uninstall_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(profile::ResolveProfile::lenient()),
        Box::new(keys::RemoveKeys),
        Box::new(cleanup::StopProcesses),
        Box::new(cleanup::RemoveDirs),
        Box::new(cli::RemoveBinaries),
        Box::new(toolchain::RemoveViaPackageManager),
        Box::new(profile::StripPathEntry),
        Box::new(toolchain::OptionallyRemoveToolchain),
    ]
}

/// Execute a step, recording its outcome in the logger.
///
/// # Errors
///
/// Returns the step's error only when it failed under
/// [`FailurePolicy::Fatal`].
pub fn execute(task: &dyn Task, ctx: &Context, env: &mut Environment) -> Result<()> {
    ctx.log.stage(task.name());

    match task.run(ctx, env) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), Outcome::Succeeded);
            Ok(())
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log.record_task(task.name(), Outcome::Skipped(reason));
            Ok(())
        }
        Err(e) => {
            let reason = format!("{e:#}");
            ctx.log
                .record_task(task.name(), Outcome::Failed(reason.clone()));
            match task.policy() {
                FailurePolicy::Fatal => {
                    ctx.log.error(&format!("{}: {reason}", task.name()));
                    Err(e.context(format!("{} failed", task.name())))
                }
                FailurePolicy::BestEffort => {
                    ctx.log.warn(&format!("{}: {reason}", task.name()));
                    Ok(())
                }
            }
        }
    }
}

/// Run `tasks` in order, stopping at the first fatal failure.
///
/// # Errors
///
/// Returns the error of the fatal step that stopped the run.
pub fn run_tasks(tasks: &[Box<dyn Task>], ctx: &Context, env: &mut Environment) -> Result<()> {
    for task in tasks {
        execute(task.as_ref(), ctx, env)?;
    }
    Ok(())
}

/// Shared helpers for step unit tests.
///
/// Provides mock collaborators and factory functions so each step test
/// module does not have to duplicate boilerplate.
#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub mod test_helpers {
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::Context;
    use crate::config::Settings;
    use crate::environment::Environment;
    use crate::error::FetchError;
    use crate::exec::{ExecResult, Executor};
    use crate::logging::{Log, Logger};
    use crate::platform::{Os, Platform};
    use crate::prompt::{Confirmation, Prompter};
    use crate::resources::download::Fetcher;

    type Handler = dyn Fn(&str, &[&str]) -> anyhow::Result<ExecResult> + Send + Sync;

    /// Successful, empty command result.
    #[must_use]
    pub fn ok_result() -> ExecResult {
        ExecResult {
            stdout: String::new(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        }
    }

    /// Failed command result with `stderr`.
    #[must_use]
    pub fn failed_result(stderr: &str) -> ExecResult {
        ExecResult {
            stdout: String::new(),
            stderr: stderr.to_string(),
            success: false,
            code: Some(1),
        }
    }

    /// Executor that records every call and answers through a handler.
    ///
    /// `which_in` resolves programs registered with
    /// [`with_programs`](Self::with_programs), then falls back to real
    /// executables in the directories of the given `path`.
    #[derive(Default)]
    pub struct MockExecutor {
        programs: HashMap<String, PathBuf>,
        calls: Mutex<Vec<String>>,
        handler: Option<Box<Handler>>,
    }

    impl std::fmt::Debug for MockExecutor {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("MockExecutor")
                .field("programs", &self.programs)
                .field("calls", &self.calls)
                .finish_non_exhaustive()
        }
    }

    impl MockExecutor {
        /// Register programs as resolvable at `/usr/bin/<name>`.
        #[must_use]
        pub fn with_programs(mut self, names: &[&str]) -> Self {
            for name in names {
                self.programs
                    .insert((*name).to_string(), Path::new("/usr/bin").join(name));
            }
            self
        }

        /// Answer every call with `handler`.
        #[must_use]
        pub fn with_handler<F>(mut self, handler: F) -> Self
        where
            F: Fn(&str, &[&str]) -> anyhow::Result<ExecResult> + Send + Sync + 'static,
        {
            self.handler = Some(Box::new(handler));
            self
        }

        /// Every call so far as `"program arg1 arg2"`.
        #[must_use]
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn dispatch(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            let mut line = vec![program];
            line.extend_from_slice(args);
            self.calls.lock().unwrap().push(line.join(" "));
            self.handler
                .as_ref()
                .map_or_else(|| Ok(ok_result()), |h| h(program, args))
        }
    }

    impl Executor for MockExecutor {
        fn run_unchecked(
            &self,
            program: &str,
            args: &[&str],
            _: &[(&str, &str)],
        ) -> anyhow::Result<ExecResult> {
            self.dispatch(program, args)
        }

        fn run_with_stdin(
            &self,
            program: &str,
            args: &[&str],
            _: &str,
            _: &[(&str, &str)],
        ) -> anyhow::Result<ExecResult> {
            let result = self.dispatch(program, args)?;
            if !result.success {
                anyhow::bail!("{program} failed: {}", result.stderr);
            }
            Ok(result)
        }

        fn run_interactive(
            &self,
            program: &str,
            args: &[&str],
            _: &[(&str, &str)],
        ) -> anyhow::Result<i32> {
            Ok(self.dispatch(program, args)?.code.unwrap_or(-1))
        }

        fn which_in(&self, program: &str, path: &str) -> Option<PathBuf> {
            if let Some(p) = self.programs.get(program) {
                return Some(p.clone());
            }
            path.split(':')
                .filter(|d| !d.is_empty())
                .map(|d| Path::new(d).join(program))
                .find(|p| crate::resources::fs::is_executable(p))
        }
    }

    /// Fetcher serving a fixed body, or failing every request.
    #[derive(Debug, Default)]
    pub struct MockFetcher {
        body: Option<String>,
        requests: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        /// Serve `body` for every URL.
        #[must_use]
        pub fn serving(body: &str) -> Self {
            Self {
                body: Some(body.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Fail every request.
        #[must_use]
        pub fn offline() -> Self {
            Self::default()
        }

        /// URLs requested so far.
        #[must_use]
        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        fn body(&self, url: &str) -> Result<String, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.body.clone().ok_or_else(|| FetchError::Request {
                url: url.to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    impl Fetcher for MockFetcher {
        fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
            self.body(url)
        }

        fn fetch_into(&self, url: &str, out: &mut dyn Write) -> Result<u64, FetchError> {
            let body = self.body(url)?;
            out.write_all(body.as_bytes())
                .map_err(|e| FetchError::Request {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;
            Ok(u64::try_from(body.len()).unwrap())
        }
    }

    /// Prompter returning a fixed answer and recording the questions.
    #[derive(Debug)]
    pub struct MockPrompter {
        answer: Confirmation,
        asked: Mutex<Vec<String>>,
    }

    impl MockPrompter {
        /// Always answer `answer`.
        #[must_use]
        pub const fn answering(answer: Confirmation) -> Self {
            Self {
                answer,
                asked: Mutex::new(Vec::new()),
            }
        }

        /// Questions asked so far.
        #[must_use]
        pub fn asked(&self) -> Vec<String> {
            self.asked.lock().unwrap().clone()
        }
    }

    impl Prompter for MockPrompter {
        fn confirm(&self, question: &str, _: Duration) -> Confirmation {
            self.asked.lock().unwrap().push(question.to_string());
            self.answer
        }
    }

    /// Environment rooted at `home` with the given `$SHELL` and an empty `PATH`.
    #[must_use]
    pub fn test_env(home: &Path, shell: &str) -> Environment {
        let home = home.display().to_string();
        let shell = shell.to_string();
        Environment::from_lookup(|key| match key {
            "HOME" => Some(home.clone()),
            "SHELL" => Some(shell.clone()),
            _ => None,
        })
        .unwrap()
    }

    /// Build a [`Context`] for `env` with default settings, a non-root Linux
    /// platform, an offline fetcher, a prompter answering no and an empty
    /// process table.
    ///
    /// Also returns the [`Logger`] so tests can inspect recorded outcomes.
    #[must_use]
    pub fn make_context(env: &Environment, executor: Arc<dyn Executor>) -> (Context, Arc<Logger>) {
        let log = Arc::new(Logger::with_log_file(None));
        let ctx = Context::new(
            Settings::default(),
            env,
            Arc::new(Platform::new(Os::Linux, false, None)),
            Arc::clone(&log) as Arc<dyn Log>,
            executor,
            Arc::new(MockFetcher::offline()),
            Arc::new(MockPrompter::answering(Confirmation::No)),
        )
        .with_proc_root(env.home.join("proc"));
        (ctx, log)
    }
}
