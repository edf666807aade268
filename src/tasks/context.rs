//! Read-only state shared by every step.
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{InstallPaths, KeyLocations, Settings};
use crate::environment::Environment;
use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::Platform;
use crate::prompt::Prompter;
use crate::resources::download::Fetcher;
use crate::resources::search::SearchLimits;

/// Shared, read-only context for step execution.
///
/// Everything that changes during a run lives in the
/// [`Environment`] passed alongside it.
pub struct Context {
    /// Settings loaded from the optional settings file.
    pub settings: Settings,
    /// Filesystem layout, computed once per run.
    pub paths: InstallPaths,
    /// Directories that may hold key files.
    pub key_locations: KeyLocations,
    /// Detected platform information.
    pub platform: Arc<Platform>,
    /// Logger for output and step recording.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Downloader (for testing or real HTTP).
    pub fetcher: Arc<dyn Fetcher>,
    /// Source of interactive answers.
    pub prompter: Arc<dyn Prompter>,
    /// Root of the process table, normally `/proc`.
    pub proc_root: PathBuf,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("settings", &self.settings)
            .field("paths", &self.paths)
            .field("key_locations", &self.key_locations)
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("executor", &self.executor)
            .field("fetcher", &self.fetcher)
            .field("prompter", &self.prompter)
            .field("proc_root", &self.proc_root)
            .finish()
    }
}

impl Context {
    /// Creates a new context, deriving paths and key locations from
    /// `settings` and `env`.
    #[must_use]
    pub fn new(
        settings: Settings,
        env: &Environment,
        platform: Arc<Platform>,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        fetcher: Arc<dyn Fetcher>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        let paths = InstallPaths::resolve(env, &settings);
        let key_locations = KeyLocations::resolve(&paths, &settings);
        Self {
            settings,
            paths,
            key_locations,
            platform,
            log,
            executor,
            fetcher,
            prompter,
            proc_root: PathBuf::from("/proc"),
        }
    }

    /// Limits for every bounded filesystem search.
    #[must_use]
    pub const fn search_limits(&self) -> SearchLimits {
        SearchLimits::from_settings(&self.settings.search)
    }

    /// Return a new context reading processes from `proc_root`.
    #[must_use]
    pub fn with_proc_root(mut self, proc_root: PathBuf) -> Self {
        self.proc_root = proc_root;
        self
    }
}
