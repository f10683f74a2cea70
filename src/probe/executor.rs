//! Running probe commands and classifying what happened.

use std::io;

use serde::Serialize;
use tracing::Level;

use crate::util::process::{Completed, OutputMode, ProcessBuilder};

/// How a probe command is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Output discarded; only the exit status matters.
    Silent,
    /// Output shown to the operator.
    Verbose,
    /// Stdout and stderr captured and attached to a successful outcome.
    Capture,
}

impl ExecMode {
    fn output_mode(self) -> OutputMode {
        match self {
            ExecMode::Silent => OutputMode::Null,
            ExecMode::Verbose => OutputMode::Inherit,
            ExecMode::Capture => OutputMode::Capture,
        }
    }
}

/// The classified result of one toolchain invocation.
///
/// `Failure` and `ExecutionError` both mean "capability absent" to callers,
/// but they are kept apart: the first says the toolchain rejected the input,
/// the second says there was no toolchain to ask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Exit status zero.
    Success { output: Option<String> },
    /// Nonzero exit status (`None` if killed by a signal).
    Failure { status: Option<i32> },
    /// The command could not be started.
    ExecutionError { reason: String },
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }

    /// Captured output of a successful capturing run.
    pub fn output(&self) -> Option<&str> {
        match self {
            ProbeOutcome::Success { output } => output.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn from_io_error(err: &io::Error) -> Self {
        ProbeOutcome::ExecutionError {
            reason: err.to_string(),
        }
    }
}

/// Spawns probe commands.
///
/// The production implementation is [`SystemRunner`]; tests substitute a
/// scripted runner to count and inspect invocations.
pub trait CommandRunner: Send + Sync {
    /// Run a command line. `Err` means it could not be started.
    fn run(&self, command: &str, mode: ExecMode) -> io::Result<Completed>;
}

/// Runs commands as real child processes.
///
/// The command line is split with shell quoting rules and the program is
/// spawned directly, so a missing compiler is a spawn error rather than a
/// shell's exit status 127.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &str, mode: ExecMode) -> io::Result<Completed> {
        let builder = ProcessBuilder::from_command_line(command)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command line"))?;
        builder.run(mode.output_mode())
    }
}

/// Run a probe command and classify the result.
///
/// When debug logging is on, the description, the literal command line, and
/// the probe source are logged first so a misconfigured build can be traced
/// back to the exact invocation.
pub fn execute(
    runner: &dyn CommandRunner,
    description: &str,
    command: &str,
    source: &str,
    mode: ExecMode,
) -> ProbeOutcome {
    if tracing::enabled!(Level::DEBUG) {
        tracing::debug!("{}", trace_message(description, command, source));
    }

    let completed = match runner.run(command, mode) {
        Ok(completed) => completed,
        Err(e) => {
            tracing::debug!("Command could not be executed! {}", e);
            return ProbeOutcome::from_io_error(&e);
        }
    };

    if let Some(ref output) = completed.output {
        tracing::debug!(
            "Output:\n-------------------------\n{}\n-------------------------",
            output
        );
    }

    if completed.success() {
        tracing::debug!("Check succeeded");
        ProbeOutcome::Success {
            output: completed.output,
        }
    } else {
        match completed.code {
            Some(code) => tracing::debug!("Check failed with exit status {}", code),
            None => tracing::debug!("Check failed: terminated by signal"),
        }
        ProbeOutcome::Failure {
            status: completed.code,
        }
    }
}

fn trace_message(description: &str, command: &str, source: &str) -> String {
    let mut message = format!("{}\nRunning: {}\n", description, command);
    if source.trim().is_empty() {
        message.push_str("Source file is empty.");
    } else {
        message.push_str("Source file contains:\n-------------------------\n");
        message.push_str(&unindent(source));
        message.push_str("\n-------------------------");
    }
    message
}

/// Strip the common leading indentation from a snippet.
fn unindent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|l| l.get(indent..).unwrap_or_else(|| l.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
