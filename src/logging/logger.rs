//! Structured logger with summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::STAGE_TARGET;
use super::types::{Log, Outcome, Report, TaskEntry};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger that also collects step outcomes for the summary.
///
/// Messages go through [`tracing`]; the global subscriber installed by
/// [`init_subscriber`](super::init_subscriber) decides where they land.
#[derive(Debug)]
pub struct Logger {
    tasks: Mutex<Vec<TaskEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger whose summary points at the log file for `command`.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::with_log_file(log_file_path(command))
    }

    /// Create a logger with an explicit (or no) log file path.
    #[must_use]
    pub const fn with_log_file(log_file: Option<PathBuf>) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Record a step outcome for the summary.
    pub fn record_task(&self, name: &str, outcome: Outcome) {
        if let Ok(mut guard) = self.tasks.lock() {
            guard.push(TaskEntry {
                name: name.to_string(),
                outcome,
            });
        }
    }

    /// Snapshot of every outcome recorded so far.
    #[must_use]
    pub fn report(&self) -> Report {
        Report {
            entries: self.tasks.lock().map_or_else(|_| vec![], |g| g.clone()),
        }
    }

    /// Count the number of failed steps.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.tasks.lock().map_or(0, |guard| {
            guard.iter().filter(|t| t.outcome.is_failure()).count()
        })
    }

    /// Print the summary of all recorded steps.
    #[allow(clippy::print_stdout)]
    pub fn print_summary(&self) {
        let report = self.report();
        if report.entries.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");

        let mut ok = 0u32;
        let mut skipped = 0u32;
        let mut failed = 0u32;

        for task in &report.entries {
            let (icon, color, suffix) = match &task.outcome {
                Outcome::Succeeded => {
                    ok += 1;
                    ("✓", "\x1b[32m", String::new())
                }
                Outcome::Skipped(reason) => {
                    skipped += 1;
                    ("○", "\x1b[33m", format!(" ({reason})"))
                }
                Outcome::Failed(reason) => {
                    failed += 1;
                    ("✗", "\x1b[31m", format!(" ({reason})"))
                }
            };
            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", task.name));
        }

        println!();
        let total = ok + skipped + failed;
        self.info(&format!(
            "{total} steps: \x1b[32m{ok} ok\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

    fn record_task(&self, name: &str, outcome: Outcome) {
        self.record_task(name, outcome);
    }
}
