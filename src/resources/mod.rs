//! Idempotent resource primitives used by install and uninstall steps.
pub mod download;
pub mod fs;
pub mod keys;
pub mod process;
pub mod profile;
pub mod search;

use anyhow::Result;

/// State of a resource (directory, profile line, etc.).
///
/// # Examples
///
/// ```
/// use soundness_installer::resources::ResourceState;
///
/// assert_ne!(ResourceState::Missing, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist or is not present.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
}

/// Result of applying a resource change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
}

/// Unified interface for resources that can be checked and applied.
///
/// # Examples
///
/// ```ignore
/// if resource.needs_change()? {
///     resource.apply()?;
/// }
/// ```
pub trait Resource {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;

    /// Bring the resource to its desired state.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be made.
    fn apply(&self) -> Result<ResourceChange>;

    /// Determine if the resource needs to be changed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`current_state`](Self::current_state).
    fn needs_change(&self) -> Result<bool> {
        Ok(self.current_state()? == ResourceState::Missing)
    }

    /// Apply only when needed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`current_state`](Self::current_state) and
    /// [`apply`](Self::apply).
    fn ensure(&self) -> Result<ResourceChange> {
        if self.needs_change()? {
            self.apply()
        } else {
            Ok(ResourceChange::AlreadyCorrect)
        }
    }
}
