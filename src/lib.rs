//! ccprobe - Compiler capability probing for C and C++ toolchains
//!
//! This crate answers build-configuration questions ("does the C compiler
//! accept `-fvisibility=hidden`?", "where is `zlib.h`?") by compiling,
//! linking, and running small throwaway programs against the host toolchain.
//!
//! ```rust,no_run
//! use ccprobe::{Language, ProbeSettings, Prober};
//!
//! let prober = Prober::new(ProbeSettings::default());
//! if prober.try_compile("Checking for alloca.h", Language::C, "#include <alloca.h>", None) {
//!     println!("have alloca.h");
//! }
//! ```

pub mod core;
pub mod probe;
pub mod util;

/// Test utilities and mocks for ccprobe unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted host environment and process
/// runner.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{language::Language, platform::HostEnv};
pub use probe::{
    CapabilityReport, HeaderLocation, ProbeError, ProbeOutcome, ProbeSettings, Prober,
    RunOutcome,
};
pub use util::config::Config;
