//! Top-level orchestration for the `install` and `uninstall` modes.
pub mod install;
pub mod uninstall;

use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::{Settings, default_settings_path};
use crate::environment::Environment;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};
use crate::platform::{PackageManager, Platform};
use crate::prompt::StdinPrompter;
use crate::resources::download::HttpFetcher;
use crate::tasks::{self, Context, Task};

/// Shared state produced by the common command setup sequence.
///
/// Captures the environment, loads settings and detects the platform so
/// that each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Read-only step context.
    pub ctx: Context,
    /// The run's environment, updated by the steps.
    pub env: Environment,
}

impl CommandSetup {
    /// Capture the environment, load settings, and build the step context
    /// with the real executor, downloader and prompter.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is unset or the settings file cannot be
    /// read or parsed.
    pub fn init(global: &GlobalOpts, log: &Arc<Logger>) -> Result<Self> {
        let env = Environment::capture()?;

        let version =
            option_env!("SOUNDNESS_INSTALLER_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
        log.info(&format!("soundness-installer {version}"));

        let settings_path = global
            .config
            .clone()
            .unwrap_or_else(|| default_settings_path(&env));
        let settings = Settings::load(&settings_path)
            .with_context(|| format!("loading {}", settings_path.display()))?;
        log.debug(&format!("settings: {}", settings_path.display()));

        let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
        let platform = Platform::detect(executor.as_ref(), &env.path);
        log.debug(&format!(
            "platform: {:?}, root: {}, package manager: {}",
            platform.os,
            platform.is_root,
            platform
                .package_manager
                .map_or("none", PackageManager::program)
        ));

        let ctx = Context::new(
            settings,
            &env,
            Arc::new(platform),
            Arc::clone(log) as Arc<dyn Log>,
            executor,
            Arc::new(HttpFetcher::new()),
            Arc::new(StdinPrompter),
        );
        Ok(Self { ctx, env })
    }

    /// Show the decorative banner, if one is configured.
    ///
    /// Failures are logged at debug level and otherwise ignored.
    #[allow(clippy::print_stdout)]
    pub fn show_logo(&self) {
        let Some(url) = &self.ctx.settings.logo_url else {
            return;
        };
        let shown = self
            .ctx
            .fetcher
            .fetch_text(url)
            .map_err(anyhow::Error::from)
            .and_then(|script| {
                self.ctx
                    .executor
                    .run_with_stdin("sh", &[], &script, &self.env.child_env())
            });
        match shown {
            Ok(result) => print!("{}", result.stdout),
            Err(e) => self.ctx.log.debug(&format!("logo unavailable: {e:#}")),
        }
    }
}

/// Run `tasks` in order, then print the summary whether or not the
/// sequence stopped early.
///
/// # Errors
///
/// Returns the error of the fatal step that stopped the run.
pub fn run_to_summary(
    tasks: &[Box<dyn Task>],
    ctx: &Context,
    env: &mut Environment,
    log: &Logger,
) -> Result<()> {
    let result = tasks::run_tasks(tasks, ctx, env);
    log.print_summary();
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::platform::Os;
    use crate::prompt::Confirmation;
    use crate::tasks::test_helpers::{MockExecutor, MockFetcher, MockPrompter, test_env};

    fn setup_with(
        logo_url: Option<&str>,
        fetcher: Arc<MockFetcher>,
        executor: Arc<MockExecutor>,
    ) -> CommandSetup {
        let home = std::env::temp_dir();
        let env = test_env(&home, "/bin/bash");
        let settings = Settings {
            logo_url: logo_url.map(str::to_string),
            ..Settings::default()
        };
        let ctx = Context::new(
            settings,
            &env,
            Arc::new(Platform::new(Os::Linux, false, None)),
            Arc::new(Logger::with_log_file(None)),
            executor,
            fetcher,
            Arc::new(MockPrompter::answering(Confirmation::No)),
        );
        CommandSetup { ctx, env }
    }

    #[test]
    fn logo_script_is_piped_to_sh() {
        let fetcher = Arc::new(MockFetcher::serving("echo soundness"));
        let executor = Arc::new(MockExecutor::default());
        let setup = setup_with(
            Some("https://example.invalid/logo.sh"),
            Arc::clone(&fetcher),
            Arc::clone(&executor),
        );
        setup.show_logo();
        assert_eq!(fetcher.requests(), vec!["https://example.invalid/logo.sh"]);
        assert_eq!(executor.calls(), vec!["sh"]);
    }

    #[test]
    fn no_logo_configured_fetches_nothing() {
        let fetcher = Arc::new(MockFetcher::serving("echo soundness"));
        let executor = Arc::new(MockExecutor::default());
        let setup = setup_with(None, Arc::clone(&fetcher), Arc::clone(&executor));
        setup.show_logo();
        assert!(fetcher.requests().is_empty());
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn unreachable_logo_is_ignored() {
        let fetcher = Arc::new(MockFetcher::offline());
        let executor = Arc::new(MockExecutor::default());
        let setup = setup_with(
            Some("https://example.invalid/logo.sh"),
            Arc::clone(&fetcher),
            Arc::clone(&executor),
        );
        setup.show_logo();
        assert_eq!(fetcher.requests().len(), 1);
        assert!(executor.calls().is_empty());
    }
}
