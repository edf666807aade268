//! Finding and signalling running processes through `/proc`.
use std::path::Path;

use anyhow::{Context as _, Result};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

/// A running process and its command line (arguments joined by spaces).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    /// Process id.
    pub pid: i32,
    /// Command line with NUL separators replaced by spaces.
    pub cmdline: String,
}

/// Enumerate processes under `proc_root` (normally `/proc`).
///
/// Returns `None` when `proc_root` is not a directory. Processes that exit
/// mid-scan, and kernel threads with an empty command line, are skipped.
#[must_use]
pub fn list_processes(proc_root: &Path) -> Option<Vec<ProcessInfo>> {
    let entries = std::fs::read_dir(proc_root).ok()?;
    let mut processes = Vec::new();
    for entry in entries.flatten() {
        let Some(pid) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<i32>().ok())
        else {
            continue;
        };
        let Ok(raw) = std::fs::read(entry.path().join("cmdline")) else {
            continue;
        };
        let cmdline = String::from_utf8_lossy(&raw)
            .split('\0')
            .filter(|arg| !arg.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !cmdline.is_empty() {
            processes.push(ProcessInfo { pid, cmdline });
        }
    }
    processes.sort_by_key(|p| p.pid);
    Some(processes)
}

/// Processes whose command line contains `needle`, minus `exclude`.
#[must_use]
pub fn select_targets(
    processes: &[ProcessInfo],
    needle: &str,
    exclude: &[i32],
) -> Vec<ProcessInfo> {
    processes
        .iter()
        .filter(|p| p.cmdline.contains(needle) && !exclude.contains(&p.pid))
        .cloned()
        .collect()
}

/// Pids that must never be signalled: this process and its parent.
#[must_use]
pub fn protected_pids() -> [i32; 2] {
    [
        nix::unistd::getpid().as_raw(),
        nix::unistd::getppid().as_raw(),
    ]
}

/// Send `SIGTERM` to `pid`.
///
/// # Errors
///
/// Returns an error if the signal cannot be delivered (process gone, or not
/// ours to signal).
pub fn terminate(pid: i32) -> Result<()> {
    signal::kill(Pid::from_raw(pid), Signal::SIGTERM)
        .with_context(|| format!("sending SIGTERM to {pid}"))
}
