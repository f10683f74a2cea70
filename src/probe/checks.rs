//! Compile, link, and run checks.

use crate::core::language::Language;

use super::command::{compile_flags, link_flags, quote_path, synthesize};
use super::executor::{execute, ExecMode, ProbeOutcome};
use super::transient::{with_temp_source, RunSandbox};
use super::Prober;

const COMPILE_PREFIX: &str = "ccprobe-compile-check-";
const LINK_PREFIX: &str = "ccprobe-link-check-";
const RUN_PREFIX: &str = "ccprobe-run-check-";

/// One toolchain invocation: what to compile and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    /// Shown in diagnostics ("Checking for ...").
    pub description: String,
    pub language: Language,
    /// Program text; may be empty.
    pub source: String,
    /// Flags placed before the source/output arguments (e.g. `-v`).
    pub driver_flags: String,
    /// Caller flags placed after the source/output arguments.
    pub flags: String,
    /// Link an executable instead of compiling an object.
    pub link: bool,
}

impl ProbeRequest {
    /// A compile-only request.
    pub fn compile(
        description: impl Into<String>,
        language: Language,
        source: impl Into<String>,
    ) -> Self {
        ProbeRequest {
            description: description.into(),
            language,
            source: source.into(),
            driver_flags: String::new(),
            flags: String::new(),
            link: false,
        }
    }

    /// A compile-and-link request.
    pub fn link(
        description: impl Into<String>,
        language: Language,
        source: impl Into<String>,
    ) -> Self {
        ProbeRequest {
            link: true,
            ..ProbeRequest::compile(description, language, source)
        }
    }

    pub fn with_flags(mut self, flags: Option<&str>) -> Self {
        self.flags = flags.unwrap_or_default().to_string();
        self
    }

    pub fn with_driver_flags(mut self, flags: impl Into<String>) -> Self {
        self.driver_flags = flags.into();
        self
    }
}

/// Result of building and running a probe program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Built and exited with status zero.
    Passed,
    /// Built, ran, and exited nonzero (`None` if killed by a signal).
    RunFailed {
        status: Option<i32>,
        output: String,
    },
    /// Built, but the executable could not be started.
    SpawnFailed { reason: String },
    /// Compiling or linking failed; the program never ran.
    BuildFailed(ProbeOutcome),
}

impl RunOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, RunOutcome::Passed)
    }
}

impl Prober {
    /// Run one request in a fresh temp source.
    ///
    /// Failing to create the source is reported like a failed spawn: the
    /// question could not be put to the toolchain.
    pub fn run_request(&self, request: &ProbeRequest, mode: ExecMode) -> ProbeOutcome {
        let prefix = if request.link { LINK_PREFIX } else { COMPILE_PREFIX };
        let result = with_temp_source(
            self.work_dir(),
            prefix,
            request.language,
            &request.source,
            |src| {
                let io_flags = if request.link {
                    let out = src.by_product(".out");
                    link_flags(src.path(), &out)
                } else {
                    let obj = src.by_product(".o");
                    compile_flags(src.path(), &obj)
                };
                let flags1 = join_flags(&request.driver_flags, &io_flags);
                let command = synthesize(
                    self.env(),
                    request.language,
                    &flags1,
                    &request.flags,
                    request.link,
                );
                execute(self.runner(), &request.description, &command, &request.source, mode)
            },
        );

        result.unwrap_or_else(|e| {
            tracing::debug!("could not create probe source: {}", e);
            ProbeOutcome::from_io_error(&e)
        })
    }

    /// Whether `source` compiles with `flags`.
    pub fn try_compile(
        &self,
        description: &str,
        language: Language,
        source: &str,
        flags: Option<&str>,
    ) -> bool {
        let request = ProbeRequest::compile(description, language, source).with_flags(flags);
        self.run_request(&request, self.status_mode()).is_success()
    }

    /// Whether `source` compiles and links into an executable with `flags`.
    pub fn try_link(
        &self,
        description: &str,
        language: Language,
        source: &str,
        flags: Option<&str>,
    ) -> bool {
        let request = ProbeRequest::link(description, language, source).with_flags(flags);
        self.run_request(&request, self.status_mode()).is_success()
    }

    /// Whether `source` builds and the resulting program exits with status zero.
    pub fn try_compile_and_run(
        &self,
        description: &str,
        language: Language,
        source: &str,
        flags: Option<&str>,
    ) -> bool {
        self.try_compile_and_run_detailed(description, language, source, flags)
            .passed()
    }

    /// Like [`try_compile_and_run`](Self::try_compile_and_run), but says which
    /// step failed.
    pub fn try_compile_and_run_detailed(
        &self,
        description: &str,
        language: Language,
        source: &str,
        flags: Option<&str>,
    ) -> RunOutcome {
        let sandbox = match RunSandbox::create(&self.settings().exe_dir) {
            Ok(sandbox) => sandbox,
            Err(e) => {
                tracing::debug!("could not create run directory: {}", e);
                return RunOutcome::BuildFailed(ProbeOutcome::from_io_error(&e));
            }
        };

        let result = with_temp_source(self.work_dir(), RUN_PREFIX, language, source, |src| {
            let exe = sandbox.executable_for(src.path());
            src.register(exe.clone());

            let command = synthesize(
                self.env(),
                language,
                &link_flags(src.path(), &exe),
                flags.unwrap_or_default(),
                true,
            );
            let build = execute(self.runner(), description, &command, source, self.status_mode());
            if !build.is_success() {
                return RunOutcome::BuildFailed(build);
            }

            tracing::debug!("Running {}", exe.display());
            match self.runner().run(&quote_path(&exe), ExecMode::Capture) {
                Err(e) => {
                    tracing::debug!("Command failed: {}", e);
                    RunOutcome::SpawnFailed {
                        reason: e.to_string(),
                    }
                }
                Ok(done) => {
                    let output = done.output.clone().unwrap_or_default();
                    tracing::debug!(
                        "Command exited with status {:?}. Output:\n--------------\n{}\n--------------",
                        done.code,
                        output
                    );
                    if done.success() {
                        RunOutcome::Passed
                    } else {
                        RunOutcome::RunFailed {
                            status: done.code,
                            output,
                        }
                    }
                }
            }
        });

        result.unwrap_or_else(|e| {
            tracing::debug!("could not create probe source: {}", e);
            RunOutcome::BuildFailed(ProbeOutcome::from_io_error(&e))
        })
    }
}

fn join_flags(a: &str, b: &str) -> String {
    match (a.trim(), b.trim()) {
        ("", b) => b.to_string(),
        (a, "") => a.to_string(),
        (a, b) => format!("{} {}", a, b),
    }
}
