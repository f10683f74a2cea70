//! Probe error types.

use thiserror::Error;

/// Errors a probe can raise.
///
/// A toolchain that is missing or rejects its input is not an error; those
/// are reported as a [`ProbeOutcome`](super::ProbeOutcome). Only caller
/// misuse ends up here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("unsupported language `{0}`; expected `c` or `c++`")]
    UnsupportedLanguage(String),
}
