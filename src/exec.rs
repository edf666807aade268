//! Process execution behind the [`Executor`] trait.
//!
//! Every command receives its environment overrides explicitly (notably
//! `PATH`, taken from the run's [`Environment`](crate::environment::Environment))
//! so nothing depends on mutating the installer's own process environment.
use anyhow::{Context, Result, bail};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over running external programs.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command with captured output, allowing failure.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process could not be spawned.
    fn run_unchecked(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<ExecResult>;

    /// Run a command with `input` written to its standard input.
    ///
    /// Used to pipe downloaded installer scripts into `sh`.
    ///
    /// # Errors
    ///
    /// Returns an error if the process could not be spawned or exits non-zero.
    fn run_with_stdin(
        &self,
        program: &str,
        args: &[&str],
        input: &str,
        env: &[(&str, &str)],
    ) -> Result<ExecResult>;

    /// Run a command attached to the user's terminal and return its exit code.
    ///
    /// Output is neither captured nor logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the process could not be spawned.
    fn run_interactive(&self, program: &str, args: &[&str], env: &[(&str, &str)]) -> Result<i32>;

    /// Resolve `program` against the colon-separated `path` list.
    fn which_in(&self, program: &str, path: &str) -> Option<PathBuf>;

    /// Run a command, bailing on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the process could not be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str], env: &[(&str, &str)]) -> Result<ExecResult> {
        let result = self.run_unchecked(program, args, env)?;
        if !result.success {
            bail!(
                "{program} failed (exit {}): {}",
                result.code.unwrap_or(-1),
                result.stderr.trim()
            );
        }
        Ok(result)
    }
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default)]
pub struct SystemExecutor;

fn command(program: &str, args: &[&str], env: &[(&str, &str)]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    for (k, v) in env {
        cmd.env(k, v);
    }
    cmd
}

impl Executor for SystemExecutor {
    fn run_unchecked(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<ExecResult> {
        let output = command(program, args, env)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn run_with_stdin(
        &self,
        program: &str,
        args: &[&str],
        input: &str,
        env: &[(&str, &str)],
    ) -> Result<ExecResult> {
        let mut child = command(program, args, env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to execute: {program}"))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .with_context(|| format!("writing to stdin of {program}"))?;
        }

        let output = child
            .wait_with_output()
            .with_context(|| format!("waiting for {program}"))?;
        let result = ExecResult::from(output);
        if !result.success {
            bail!(
                "{program} failed (exit {}): {}",
                result.code.unwrap_or(-1),
                result.stderr.trim()
            );
        }
        Ok(result)
    }

    fn run_interactive(&self, program: &str, args: &[&str], env: &[(&str, &str)]) -> Result<i32> {
        let status = command(program, args, env)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(status.code().unwrap_or(-1))
    }

    fn which_in(&self, program: &str, path: &str) -> Option<PathBuf> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        which::which_in(program, Some(path), cwd).ok()
    }
}

/// Render a path as `&str` for use as a command argument.
///
/// # Errors
///
/// Returns an error if the path is not valid UTF-8.
pub fn path_arg(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("path is not valid UTF-8: {}", path.display()))
}
