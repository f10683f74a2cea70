//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// What to do with a child's stdout and stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Discard both streams.
    Null,
    /// Let the child write to our terminal.
    Inherit,
    /// Capture both streams.
    Capture,
}

/// Exit status and (in capture mode) the combined output of a child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed {
    /// Exit code, or `None` if the child was killed by a signal.
    pub code: Option<i32>,
    /// Stdout followed by stderr, lossily decoded.
    pub output: Option<String>,
}

impl Completed {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Split a command line into program and arguments.
    ///
    /// Returns `None` for an empty line. Quoting follows POSIX shell rules.
    pub fn from_command_line(line: &str) -> Result<Option<Self>, shell_words::ParseError> {
        let mut words = shell_words::split(line)?.into_iter();
        Ok(words.next().map(|program| ProcessBuilder::new(program).args(words)))
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(Stdio::null());
        cmd
    }

    /// Run to completion with the given output handling.
    ///
    /// An `Err` means the program could not be started at all; a program
    /// that starts and fails is an `Ok` with a nonzero code.
    pub fn run(&self, mode: OutputMode) -> io::Result<Completed> {
        let mut cmd = self.build_command();

        match mode {
            OutputMode::Null => {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
                let status = cmd.status()?;
                Ok(Completed {
                    code: status.code(),
                    output: None,
                })
            }
            OutputMode::Inherit => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
                let status = cmd.status()?;
                Ok(Completed {
                    code: status.code(),
                    output: None,
                })
            }
            OutputMode::Capture => {
                let output = cmd.output()?;
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                Ok(Completed {
                    code: output.status.code(),
                    output: Some(text),
                })
            }
        }
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
