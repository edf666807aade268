//! Core logging types: step outcomes, the run report, and the [`Log`] trait.
use std::fmt;

/// How a single step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The step did its work (or confirmed nothing needed doing).
    Succeeded,
    /// The step deliberately did nothing.
    Skipped(String),
    /// The step failed; for best-effort steps the run continued.
    Failed(String),
}

impl Outcome {
    /// Whether this outcome is a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "ok"),
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// One step's entry in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    /// Human-readable step name.
    pub name: String,
    /// How the step ended.
    pub outcome: Outcome,
}

/// Ordered outcomes of every step that ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Entries in execution order.
    pub entries: Vec<TaskEntry>,
}

impl Report {
    /// Outcome of the step called `name`, if it ran.
    #[must_use]
    pub fn outcome_of(&self, name: &str) -> Option<&Outcome> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.outcome)
    }

    /// Number of failed steps.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_failure()).count()
    }

    /// Names of the steps that ran, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

/// Abstraction over logging backends.
///
/// Steps log through this trait so tests can run them without a global
/// subscriber.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record a step outcome for the summary.
    fn record_task(&self, name: &str, outcome: Outcome);
}
