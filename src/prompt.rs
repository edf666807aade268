//! Interactive prompts.
//!
//! The bounded confirmation reads its answer on a helper thread and gives up
//! after a timeout; a late answer is discarded.
use std::io::{self, BufRead, Write as _};
use std::sync::mpsc;
use std::time::Duration;

use crate::cli::Mode;

/// Answer to a bounded yes/no prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The user agreed in time.
    Yes,
    /// The user declined, or gave any answer other than yes.
    No,
    /// No answer arrived before the deadline.
    TimedOut,
}

impl Confirmation {
    /// Only an explicit, timely yes counts as consent.
    #[must_use]
    pub const fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }

    /// Interpret a line of user input.
    #[must_use]
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Self::Yes,
            _ => Self::No,
        }
    }
}

/// Source of interactive answers.
pub trait Prompter: Send + Sync + std::fmt::Debug {
    /// Ask a yes/no question, waiting at most `timeout`.
    fn confirm(&self, question: &str, timeout: Duration) -> Confirmation;
}

/// [`Prompter`] reading from the process's standard input.
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    #[allow(clippy::print_stdout)]
    fn confirm(&self, question: &str, timeout: Duration) -> Confirmation {
        print!("{question} [y/N] ({}s) ", timeout.as_secs());
        io::stdout().flush().ok();
        let answer = confirm_from(
            || {
                let mut line = String::new();
                io::stdin().lock().read_line(&mut line).ok().map(|_| line)
            },
            timeout,
        );
        if answer == Confirmation::TimedOut {
            println!();
        }
        answer
    }
}

/// Run `read` on a helper thread and interpret its line within `timeout`.
///
/// A reader that fails or hits end-of-input counts as `No`.
pub fn confirm_from<F>(read: F, timeout: Duration) -> Confirmation
where
    F: FnOnce() -> Option<String> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        tx.send(read()).ok();
    });
    match rx.recv_timeout(timeout) {
        Ok(Some(line)) => Confirmation::from_answer(&line),
        Ok(None) | Err(mpsc::RecvTimeoutError::Disconnected) => Confirmation::No,
        Err(mpsc::RecvTimeoutError::Timeout) => Confirmation::TimedOut,
    }
}

/// Ask which mode to run when no argument was given.
///
/// Accepts only `1` (install) or `2` (uninstall); anything else is `None`.
///
/// # Errors
///
/// Returns an error if reading from `input` fails.
#[allow(clippy::print_stdout)]
pub fn select_mode(mut input: impl BufRead) -> io::Result<Option<Mode>> {
    println!("What would you like to do?");
    println!("  \x1b[1m1\x1b[0m) Install the Soundness CLI");
    println!("  \x1b[1m2\x1b[0m) Uninstall the Soundness CLI");
    print!("\nSelect [1-2]: ");
    io::stdout().flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(match line.trim() {
        "1" => Some(Mode::Install),
        "2" => Some(Mode::Uninstall),
        _ => None,
    })
}
