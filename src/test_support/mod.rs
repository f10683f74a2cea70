//! Test doubles for the host environment and process execution.
//!
//! Probes never touch the real environment or spawn real compilers in unit
//! tests. Instead:
//!
//! - [`MockEnv`] scripts environment variables, the OS name, `PATH`
//!   contents, and which files exist.
//! - [`MockRunner`] answers command lines by substring match and records
//!   every invocation, so tests can assert how many processes a probe
//!   spawned and with what arguments.
//!
//! # Example
//!
//! ```rust,ignore
//! let runner = MockRunner::new().respond("-Wno-attributes", MockRunner::exit(0));
//! let prober = mock_prober(MockEnv::new("linux"), &runner, tmp.path());
//!
//! assert!(prober.compiler_supports_wno_attributes_flag());
//! assert_eq!(runner.commands().len(), 1);
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::core::platform::{HostEnv, OsName};
use crate::probe::{CommandRunner, ExecMode, ProbeSettings, Prober};
use crate::util::process::Completed;

/// Scripted host environment.
#[derive(Debug, Clone)]
pub struct MockEnv {
    os: OsName,
    vars: HashMap<String, String>,
    commands: HashMap<String, PathBuf>,
    files: HashSet<PathBuf>,
}

impl MockEnv {
    /// An environment on `os` with no variables, an empty `PATH`, and no files.
    pub fn new(os: &str) -> Self {
        MockEnv {
            os: OsName::new(os),
            vars: HashMap::new(),
            commands: HashMap::new(),
            files: HashSet::new(),
        }
    }

    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }

    /// Make `name` resolvable on `PATH` at `path`.
    pub fn with_command(mut self, name: &str, path: &str) -> Self {
        self.commands.insert(name.to_string(), PathBuf::from(path));
        self
    }

    pub fn with_file(mut self, path: &str) -> Self {
        self.files.insert(PathBuf::from(path));
        self
    }
}

impl HostEnv for MockEnv {
    fn string_env(&self, name: &str) -> Option<String> {
        self.vars.get(name).filter(|v| !v.is_empty()).cloned()
    }

    fn os_name(&self) -> OsName {
        self.os.clone()
    }

    fn find_command(&self, name: &str) -> Option<PathBuf> {
        self.commands.get(name).cloned()
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.contains(path)
    }
}

/// How the mock answers a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// The program ran and exited.
    Exit {
        code: Option<i32>,
        output: Option<String>,
    },
    /// The program could not be started.
    SpawnError(io::ErrorKind),
}

type Handler = Arc<dyn Fn(&str) -> MockResponse + Send + Sync>;

#[derive(Clone)]
enum Responder {
    Fixed(MockResponse),
    Dynamic(Handler),
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Responder::Fixed(r) => f.debug_tuple("Fixed").field(r).finish(),
            Responder::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    responses: Vec<(String, Responder)>,
    calls: Vec<(String, ExecMode)>,
}

/// Scripted process runner.
///
/// Responses are matched in registration order by substring; the first
/// match wins. Unmatched commands fail to spawn with `NotFound`, as if no
/// toolchain were installed. Clones share state, so a test can hand one
/// clone to a [`Prober`] and inspect calls through another.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    state: Arc<Mutex<MockState>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands containing `pattern` with `response`.
    pub fn respond(self, pattern: &str, response: MockResponse) -> Self {
        self.push(pattern, Responder::Fixed(response));
        self
    }

    /// Answer commands containing `pattern` by calling `handler`.
    pub fn respond_with(
        self,
        pattern: &str,
        handler: impl Fn(&str) -> MockResponse + Send + Sync + 'static,
    ) -> Self {
        self.push(pattern, Responder::Dynamic(Arc::new(handler)));
        self
    }

    /// Exit with `code` and no output.
    pub fn exit(code: i32) -> MockResponse {
        MockResponse::Exit {
            code: Some(code),
            output: None,
        }
    }

    /// Exit with `code` after printing `output`.
    pub fn captured(code: i32, output: impl Into<String>) -> MockResponse {
        MockResponse::Exit {
            code: Some(code),
            output: Some(output.into()),
        }
    }

    pub fn not_found() -> MockResponse {
        MockResponse::SpawnError(io::ErrorKind::NotFound)
    }

    /// Every command line run so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(c, _)| c.clone())
            .collect()
    }

    /// The mode of every command run so far, in order.
    pub fn modes(&self) -> Vec<ExecMode> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(_, m)| *m)
            .collect()
    }

    fn push(&self, pattern: &str, responder: Responder) {
        self.state
            .lock()
            .unwrap()
            .responses
            .push((pattern.to_string(), responder));
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, command: &str, mode: ExecMode) -> io::Result<Completed> {
        let responder = {
            let mut state = self.state.lock().unwrap();
            state.calls.push((command.to_string(), mode));
            state
                .responses
                .iter()
                .find(|(pattern, _)| command.contains(pattern.as_str()))
                .map(|(_, r)| r.clone())
        };

        let response = match responder {
            Some(Responder::Fixed(r)) => r,
            Some(Responder::Dynamic(handler)) => handler(command),
            None => MockRunner::not_found(),
        };

        match response {
            MockResponse::Exit { code, output } => Ok(Completed {
                code,
                output: match mode {
                    ExecMode::Capture => Some(output.unwrap_or_default()),
                    ExecMode::Silent | ExecMode::Verbose => None,
                },
            }),
            MockResponse::SpawnError(kind) => {
                Err(io::Error::new(kind, format!("mock: cannot run `{}`", command)))
            }
        }
    }
}

/// A prober wired to mocks, with all temp files under `dir`.
pub fn mock_prober(env: MockEnv, runner: &MockRunner, dir: &Path) -> Prober {
    Prober::with_host(
        Arc::new(env),
        Arc::new(runner.clone()),
        ProbeSettings {
            work_dir: dir.to_path_buf(),
            exe_dir: dir.to_path_buf(),
            verbose: false,
        },
    )
}
