//! Compiler capability probing.
//!
//! A probe answers one question about the host toolchain by compiling (and
//! sometimes linking and running) a tiny generated program:
//!
//! 1. [`command`] builds the compiler command line, layering in the
//!    `EXTRA_*FLAGS` environment overrides.
//! 2. [`transient`] writes the probe source to a unique temp file and
//!    removes it, and everything built from it, afterwards.
//! 3. [`executor`] runs the command and classifies the result as success,
//!    failure, or "could not run at all".
//! 4. [`cache`] remembers answers to fixed questions for the life of the
//!    [`Prober`].
//! 5. [`header`] recovers a header's path from the compiler's verbose
//!    include search listing.
//!
//! The named capability checks built on top live in [`capabilities`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod cache;
pub mod capabilities;
pub mod checks;
pub mod command;
mod errors;
pub mod executor;
pub mod header;
pub mod transient;

pub use cache::{CachePolicy, CapabilityCache, ProbeDef};
pub use capabilities::CapabilityReport;
pub use checks::{ProbeRequest, RunOutcome};
pub use errors::ProbeError;
pub use executor::{CommandRunner, ExecMode, ProbeOutcome, SystemRunner};
pub use header::HeaderLocation;

use crate::core::platform::{HostEnv, SystemEnv};

/// Where probes put their files and how they report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Directory for generated sources and object files.
    pub work_dir: PathBuf,
    /// Root under which run checks create their executable directories.
    pub exe_dir: PathBuf,
    /// Show toolchain output instead of discarding it.
    pub verbose: bool,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        let tmp = std::env::temp_dir();
        ProbeSettings {
            work_dir: tmp.clone(),
            exe_dir: tmp,
            verbose: false,
        }
    }
}

/// Entry point for all probes.
///
/// Owns the host lookups, the process runner, and the capability cache.
/// Create one per configuration run; cached answers live as long as it does.
pub struct Prober {
    env: Arc<dyn HostEnv>,
    runner: Arc<dyn CommandRunner>,
    settings: ProbeSettings,
    cache: CapabilityCache,
}

impl Prober {
    /// A prober for the real host.
    pub fn new(settings: ProbeSettings) -> Self {
        Prober::with_host(Arc::new(SystemEnv), Arc::new(SystemRunner), settings)
    }

    /// A prober with explicit host lookups and process runner.
    pub fn with_host(
        env: Arc<dyn HostEnv>,
        runner: Arc<dyn CommandRunner>,
        settings: ProbeSettings,
    ) -> Self {
        Prober {
            env,
            runner,
            settings,
            cache: CapabilityCache::new(),
        }
    }

    pub fn env(&self) -> &dyn HostEnv {
        self.env.as_ref()
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    pub fn cache(&self) -> &CapabilityCache {
        &self.cache
    }

    pub(crate) fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    pub(crate) fn work_dir(&self) -> &Path {
        &self.settings.work_dir
    }

    /// Mode for checks that only care about the exit status.
    pub(crate) fn status_mode(&self) -> ExecMode {
        if self.settings.verbose {
            ExecMode::Verbose
        } else {
            ExecMode::Silent
        }
    }
}

impl std::fmt::Debug for Prober {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prober")
            .field("settings", &self.settings)
            .field("cached", &self.cache.len())
            .finish()
    }
}
